//! End-to-end tests for `PackageDb` over manifests in a temp directory.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pkgdb_core::{
    CertFingerprint, CertificatePolicy, DbError, DbOptions, FixedEntry, NoSelfEntry, OrphanPolicy,
    OwnerId, PackageDb, PackageRecord, RefreshOutcome, SelfEntryProvider, SourcePaths,
};
use tempfile::TempDir;

const SIGNER_HEX: &str = include_str!("fixtures/signer.hex");
const SIGNER_SHA1: &str = include_str!("fixtures/signer.sha1");
const PLATFORM_HEX: &str = include_str!("fixtures/platform.hex");

struct Fixture {
    _dir: TempDir,
    paths: SourcePaths,
}

impl Fixture {
    fn new(xml: &str, list: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let paths = SourcePaths::in_dir(dir.path());
        fs::write(&paths.markup, xml).unwrap();
        fs::write(&paths.list, list).unwrap();
        Self { _dir: dir, paths }
    }

    fn open(&self) -> PackageDb {
        self.open_with(DbOptions::default(), Box::new(NoSelfEntry))
    }

    fn open_with(&self, options: DbOptions, provider: Box<dyn SelfEntryProvider>) -> PackageDb {
        PackageDb::open_with(self.paths.clone(), options, provider).expect("open")
    }

    /// Rewrite a manifest and push its mtime `ahead` seconds into the future.
    fn rewrite(&self, path: &Path, content: &str, ahead: u64) {
        fs::write(path, content).unwrap();
        set_mtime(path, ahead);
    }

    fn rewrite_xml(&self, content: &str, ahead: u64) {
        self.rewrite(&self.paths.markup, content, ahead);
    }

    fn rewrite_list(&self, content: &str, ahead: u64) {
        self.rewrite(&self.paths.list, content, ahead);
    }
}

fn set_mtime(path: &Path, ahead: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(ahead))
        .unwrap();
}

fn packages(body: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='utf-8' standalone='yes' ?>\n<packages>\n\
         <version sdkVersion=\"34\" databaseVersion=\"3\" />\n{body}</packages>\n"
    )
}

fn signed_package(name: &str, user_id: u32, shared: u32, hex: &str) -> String {
    format!(
        "<package name=\"{name}\" codePath=\"/data/app/{name}-1\" publicFlags=\"0\" \
         userId=\"{user_id}\" sharedUserId=\"{shared}\" installer=\"x\" version=\"1\">\
         <sigs count=\"1\"><cert index=\"0\" key=\"{}\" /></sigs></package>\n",
        hex.trim()
    )
}

fn plain_package(name: &str, user_id: u32) -> String {
    format!("<package name=\"{name}\" codePath=\"/data/app/{name}-1\" userId=\"{user_id}\" />\n")
}

fn names(records: &[Arc<PackageRecord>]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn line_fields_overlay_markup_identity() {
    let fx = Fixture::new(
        &packages(&plain_package("app.one", 10050)),
        "app.one 10050 0 /data/app.one seinfo:default 10050,10051\n",
    );
    let db = fx.open();

    let pkg = db.get_by_name("app.one").expect("app.one");
    assert_eq!(pkg.owner_id, OwnerId::new(10050));
    assert_eq!(pkg.group_ids, vec![10050, 10051]);
    assert_eq!(pkg.data_path.as_deref(), Some(Path::new("/data/app.one")));
    assert_eq!(pkg.security_label.as_deref(), Some("seinfo:default"));
    assert!(pkg.certificate().is_none());
    assert!(pkg.certificate_fingerprint().is_none());
}

#[test]
fn shared_owner_id_package_with_certificate() {
    let fx = Fixture::new(
        &packages(&signed_package("com.example.shared", 0, 10100, SIGNER_HEX)),
        "unrelated 10200 0 /data/unrelated default none\n",
    );
    let db = fx.open();

    let all = db.get_all_by_owner_id(OwnerId::new(10100));
    assert_eq!(names(&all), vec!["com.example.shared"]);
    let expected: CertFingerprint = SIGNER_SHA1.trim().parse().unwrap();
    assert_eq!(all[0].certificate_fingerprint(), Some(expected));
    assert!(all[0].group_ids.is_empty());
    assert_eq!(
        all[0].signer.as_ref().unwrap().common_name().as_deref(),
        Some("Test Signer")
    );
}

#[test]
fn rebuilding_unchanged_files_is_idempotent() {
    let fx = Fixture::new(
        &packages(&format!(
            "{}{}{}",
            signed_package("b.app", 10001, 0, SIGNER_HEX),
            signed_package("a.app", 0, 1000, PLATFORM_HEX),
            plain_package("c.app", 1000),
        )),
        "a.app 1000 0 /data/a default 3003\nb.app 10001 1 /data/b default none\n",
    );
    let db = fx.open();
    let first = db.rebuild().unwrap();
    let second = db.rebuild().unwrap();

    assert_eq!(second.generation(), first.generation() + 1);
    let lhs: Vec<&PackageRecord> = first.iter().map(|r| &**r).collect();
    let rhs: Vec<&PackageRecord> = second.iter().map(|r| &**r).collect();
    assert_eq!(lhs, rhs);
    let owners = |s: &pkgdb_core::Snapshot| {
        s.owners()
            .map(|(id, bucket)| (id, names(bucket).join(",")))
            .collect::<Vec<_>>()
    };
    assert_eq!(owners(&first), owners(&second));
}

#[test]
fn first_by_owner_id_is_smallest_name() {
    let fx = Fixture::new(
        &packages(&format!(
            "{}{}{}",
            plain_package("com.android.systemui", 1000),
            plain_package("android", 1000),
            plain_package("com.android.settings", 1000),
        )),
        "",
    );
    let db = fx.open();
    for _ in 0..3 {
        assert_eq!(
            db.get_first_by_owner_id(OwnerId::new(1000)).unwrap().name,
            "android"
        );
    }
    assert_eq!(
        names(&db.get_all_by_owner_id(OwnerId::new(1000))),
        vec!["android", "com.android.settings", "com.android.systemui"]
    );
    assert!(db.get_first_by_owner_id(OwnerId::new(4242)).is_none());
    assert!(db.get_all_by_owner_id(OwnerId::new(4242)).is_empty());
}

#[test]
fn changed_manifest_is_picked_up_by_next_lookup() {
    let fx = Fixture::new(&packages(&plain_package("a", 10001)), "");
    let db = fx.open();
    let before = db.last_update();
    assert!(db.get_by_name("b").is_none());

    fx.rewrite_xml(
        &packages(&format!("{}{}", plain_package("a", 10001), plain_package("b", 10002))),
        10,
    );
    assert!(db.get_by_name("b").is_some());
    assert!(db.last_update() > before);
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Fresh);
}

#[test]
fn removed_package_disappears_after_rebuild() {
    let fx = Fixture::new(
        &packages(&format!("{}{}", plain_package("a", 1), plain_package("gone", 2))),
        "gone 2 0 /data/gone default none\n",
    );
    let db = fx.open();
    assert!(db.get_by_name("gone").is_some());

    fx.rewrite_xml(&packages(&plain_package("a", 1)), 10);
    fx.rewrite_list("", 10);
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Rebuilt);
    assert!(db.get_by_name("gone").is_none());
    assert!(db.get_all_by_owner_id(OwnerId::new(2)).is_empty());
}

#[test]
fn failed_rebuild_keeps_previous_snapshot() {
    let fx = Fixture::new(
        &packages(&signed_package("app", 10050, 0, SIGNER_HEX)),
        "app 10050 0 /data/app default 10050\n",
    );
    let db = fx.open();
    let before_update = db.last_update();
    let before_gen = db.snapshot().generation();
    let before_pkg = db.get_by_name("app").unwrap();

    fx.rewrite_list("app notanumber 0 /data/app default none\n", 10);

    let err = db.refresh().unwrap_err();
    assert!(err.is_parse());
    assert_eq!(err.path(), fx.paths.list.as_path());

    // Lookups still see the old data.
    assert_eq!(db.get_by_name("app").unwrap(), before_pkg);
    assert_eq!(names(&db.get_all_by_owner_id(OwnerId::new(10050))), vec!["app"]);
    assert_eq!(db.last_update(), before_update);
    assert_eq!(db.snapshot().generation(), before_gen);
}

#[test]
fn failed_stamps_are_not_retried_until_files_change() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "");
    let db = fx.open();

    fx.rewrite_xml("<packages><package name=\"a\" userId=\"0\" /></packages>", 10);
    assert!(matches!(db.refresh(), Err(DbError::Parse { .. })));
    // Same broken bytes, same stamps: no second attempt.
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Fresh);

    fx.rewrite_xml(&packages(&plain_package("fixed", 2)), 20);
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Rebuilt);
    assert!(db.get_by_name("fixed").is_some());
    assert!(db.get_by_name("a").is_none());
}

#[test]
fn read_failure_is_retried_with_unchanged_stamps() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "");
    let db = fx.open();

    fx.rewrite_xml(&packages(&(plain_package("a", 1) + &plain_package("b", 2))), 10);
    // A directory stats fine but cannot be read as a manifest.
    fs::remove_file(&fx.paths.list).unwrap();
    fs::create_dir(&fx.paths.list).unwrap();
    let list_mtime = fs::metadata(&fx.paths.list).unwrap().modified().unwrap();
    assert!(matches!(db.refresh(), Err(DbError::Io { .. })));
    assert!(db.get_by_name("b").is_none());

    // Restore the file under the same mtime pair.
    fs::remove_dir(&fx.paths.list).unwrap();
    fs::write(&fx.paths.list, "").unwrap();
    File::options()
        .write(true)
        .open(&fx.paths.list)
        .unwrap()
        .set_modified(list_mtime)
        .unwrap();

    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Rebuilt);
    assert!(db.get_by_name("b").is_some());
}

#[test]
fn future_mtime_does_not_force_rebuild_on_every_call() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "");
    let db = fx.open();
    set_mtime(&fx.paths.list, 3600);

    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Rebuilt);
    let generation = db.snapshot().generation();
    for _ in 0..5 {
        assert_eq!(db.refresh().unwrap(), RefreshOutcome::Fresh);
    }
    assert_eq!(db.snapshot().generation(), generation);
}

#[test]
fn unreadable_manifest_skips_refresh() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "a 1 0 /data/a default none\n");
    let db = fx.open();

    fs::remove_file(&fx.paths.list).unwrap();
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Unknown);
    assert!(db.get_by_name("a").is_some());
}

#[test]
fn open_reports_missing_and_malformed_files() {
    let dir = TempDir::new().unwrap();
    let paths = SourcePaths::in_dir(dir.path());
    fs::write(&paths.markup, packages("")).unwrap();
    let err = PackageDb::open_with(paths.clone(), DbOptions::default(), Box::new(NoSelfEntry))
        .unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
    assert_eq!(err.path(), paths.list.as_path());

    fs::write(&paths.list, "").unwrap();
    fs::write(&paths.markup, "<packages><package").unwrap();
    let err = PackageDb::open_with(paths, DbOptions::default(), Box::new(NoSelfEntry))
        .unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn orphan_policy_controls_line_only_entries() {
    let xml = packages(&plain_package("known", 1));
    let list = "known 1 0 /data/known default none\norphan 2 0 /data/orphan default none\n";

    let fx = Fixture::new(&xml, list);
    let admit = fx.open();
    let orphan = admit.get_by_name("orphan").expect("admitted");
    assert!(orphan.install_path.is_none());
    assert!(orphan.signer.is_none());

    let skip = fx.open_with(
        DbOptions {
            orphans: OrphanPolicy::Skip,
            ..DbOptions::default()
        },
        Box::new(NoSelfEntry),
    );
    assert!(skip.get_by_name("orphan").is_none());
    assert!(skip.get_by_name("known").is_some());
}

#[test]
fn lenient_certificates_degrade_one_record() {
    let xml = packages(&format!(
        "{}{}",
        signed_package("good", 10001, 0, SIGNER_HEX),
        signed_package("bad", 10002, 0, "30820102deadbeef"),
    ));
    let fx = Fixture::new(&xml, "");

    let strict = PackageDb::open_with(fx.paths.clone(), DbOptions::default(), Box::new(NoSelfEntry));
    assert!(strict.unwrap_err().is_parse());

    let lenient = fx.open_with(
        DbOptions {
            certificates: CertificatePolicy::Lenient,
            ..DbOptions::default()
        },
        Box::new(NoSelfEntry),
    );
    assert!(lenient.get_by_name("bad").unwrap().signer.is_none());
    assert!(lenient.get_by_name("good").unwrap().signer.is_some());
}

#[test]
fn self_entry_is_added_on_every_rebuild() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "");
    let provider = FixedEntry(PackageRecord::new("caller-uid-2000", OwnerId::new(2000)));
    let db = fx.open_with(DbOptions::default(), Box::new(provider));

    assert!(db.get_by_name("caller-uid-2000").is_some());
    db.rebuild().unwrap();
    assert_eq!(
        db.get_first_by_owner_id(OwnerId::new(2000)).unwrap().name,
        "caller-uid-2000"
    );
    assert_eq!(db.snapshot().len(), 2);
}

#[test]
fn close_is_idempotent_and_empties_lookups() {
    let fx = Fixture::new(&packages(&plain_package("a", 1)), "");
    let db = fx.open();
    let built = db.last_update();

    db.close();
    db.close();
    assert!(db.is_closed());
    assert!(db.get_by_name("a").is_none());
    assert!(db.get_all_by_owner_id(OwnerId::new(1)).is_empty());
    assert_eq!(db.last_update(), built);

    // Changes after close are ignored.
    fx.rewrite_xml(&packages(&plain_package("b", 2)), 10);
    assert_eq!(db.refresh().unwrap(), RefreshOutcome::Fresh);
    assert!(db.get_by_name("b").is_none());
    assert!(db.rebuild().unwrap().is_empty());
}

#[test]
fn readers_see_whole_snapshots_during_rebuilds() {
    let small = packages(&plain_package("a", 1000));
    let large = packages(&format!(
        "{}{}{}",
        plain_package("a", 1000),
        plain_package("b", 1000),
        plain_package("c", 1000)
    ));
    let fx = Fixture::new(&small, "");
    let db = fx.open();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let snap = db.snapshot();
                    let bucket = snap.get_all_by_owner_id(OwnerId::new(1000));
                    assert_eq!(bucket.len(), snap.len());
                    assert!(snap.len() == 1 || snap.len() == 3);
                }
            });
        }
        for i in 0..20u64 {
            let body = if i % 2 == 0 { &large } else { &small };
            fs::write(&fx.paths.markup, body).unwrap();
            db.rebuild().unwrap();
        }
    });
}
