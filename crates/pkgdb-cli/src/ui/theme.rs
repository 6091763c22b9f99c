//! Colors and column widths shared by every command.

use crossterm::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub package_name: Color,
    pub uid: Color,
    pub secondary: Color,
    pub header: Color,
    pub warning: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub name_width: usize,
    pub uid_width: usize,
    /// Width of the label column in detail views
    pub label_width: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub colors: Colors,
    pub layout: Layout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: Colors {
                package_name: Color::White,
                uid: Color::Cyan,
                secondary: Color::DarkGrey,
                header: Color::DarkGrey,
                warning: Color::Yellow,
            },
            layout: Layout {
                name_width: 48,
                uid_width: 8,
                label_width: 12,
            },
        }
    }
}
