// tests/resolution.rs

//! End-to-end resolution against generated repositories

mod common;

use common::{TestPackage, write_repo};
use depchase::Error;
use depchase::index::PackageIndex;
use depchase::output::{OutputFiles, write_results};
use depchase::packages::{ArchPolicy, Capability};
use depchase::repository::{LocalFetcher, OVERRIDE_PRIORITY, RepoCache, RepoDescriptor, load_index};
use depchase::resolver::{
    DependencySet, GreedySolver, ResolveOptions, resolve_closure, resolve_selfhost, resolve_with_solver,
    source_packages,
};
use std::fs;
use std::rc::Rc;
use std::sync::Arc;
use tempfile::TempDir;

/// Binary and paired source repository plus a cache, kept alive together
struct Fixture {
    _dirs: Vec<TempDir>,
    index: PackageIndex,
}

fn fixture(binaries: &[TestPackage], sources: &[TestPackage]) -> Fixture {
    let bin_dir = TempDir::new().unwrap();
    let src_dir = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    write_repo(bin_dir.path(), binaries);
    write_repo(src_dir.path(), sources);

    let descriptors = vec![
        RepoDescriptor::new("test", bin_dir.path().display().to_string()),
        RepoDescriptor::new("test-source", src_dir.path().display().to_string()),
    ];
    let index = load_index(
        &descriptors,
        ArchPolicy::new("x86_64"),
        Rc::new(LocalFetcher),
        RepoCache::new(cache.path()),
    )
    .unwrap();
    Fixture {
        _dirs: vec![bin_dir, src_dir, cache],
        index,
    }
}

fn root(index: &PackageIndex, name: &str) -> Arc<depchase::Package> {
    index.lookup_spec(name).into_result(name).unwrap()
}

fn names(set: &DependencySet) -> Vec<&str> {
    set.iter().map(|p| p.name.as_str()).collect()
}

fn ambiguous_provider() -> Fixture {
    fixture(
        &[
            TestPackage::binary("pkg-a", "x86_64", "1.0").requires(&["libfoo"]),
            TestPackage::binary("foo-1", "x86_64", "1.0").provides(&["libfoo"]),
            TestPackage::binary("foo-2", "x86_64", "1.0").provides(&["libfoo"]),
        ],
        &[
            TestPackage::source("pkg-a", "1.0"),
            TestPackage::source("foo-1", "1.0"),
            TestPackage::source("foo-2", "1.0"),
        ],
    )
}

#[test]
fn test_hint_decides_ambiguous_requirement() {
    let fx = ambiguous_provider();
    let roots = [root(&fx.index, "pkg-a")];

    let closure = resolve_closure(&fx.index, &roots, &ResolveOptions::default()).unwrap();
    assert_eq!(names(&closure.packages), vec!["pkg-a"]);
    assert_eq!(closure.ambiguities.len(), 1);
    let keys: Vec<&str> = closure.ambiguities[0].keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["foo-1#x86_64", "foo-2#x86_64"]);

    for (hints, expected) in [(vec!["foo-2"], "foo-2"), (vec!["bar", "foo-1", "foo-2"], "foo-1")] {
        let options = ResolveOptions {
            hints: hints.iter().map(|h| h.to_string()).collect(),
            ..ResolveOptions::default()
        };
        let closure = resolve_closure(&fx.index, &roots, &options).unwrap();
        assert_eq!(names(&closure.packages), vec!["pkg-a", expected]);
        assert!(closure.ambiguities.is_empty());
    }
}

#[test]
fn test_filtered_package_is_left_out() {
    let fx = ambiguous_provider();
    let options = ResolveOptions {
        hints: vec!["foo-2".to_string()],
        filters: ["foo-2".to_string()].into_iter().collect(),
        ..ResolveOptions::default()
    };
    let closure = resolve_closure(&fx.index, &[root(&fx.index, "pkg-a")], &options).unwrap();
    assert_eq!(names(&closure.packages), vec!["pkg-a"]);
    assert!(closure.ambiguities.is_empty());
}

#[test]
fn test_hint_selects_last_provider() {
    let fx = fixture(
        &[
            TestPackage::binary("app", "x86_64", "1.0").requires(&["libfoo"]),
            TestPackage::binary("foo-a", "x86_64", "1.0").provides(&["libfoo"]),
            TestPackage::binary("foo-b", "x86_64", "1.0").provides(&["libfoo"]),
            TestPackage::binary("foo-c", "x86_64", "1.0").provides(&["libfoo"]),
        ],
        &[TestPackage::source("app", "1.0")],
    );
    let roots = [root(&fx.index, "app")];

    let options = ResolveOptions {
        hints: vec!["foo-c".to_string()],
        ..ResolveOptions::default()
    };
    let closure = resolve_closure(&fx.index, &roots, &options).unwrap();
    assert_eq!(names(&closure.packages), vec!["app", "foo-c"]);
    assert!(closure.ambiguities.is_empty());

    let options = ResolveOptions {
        pick_first: true,
        ..ResolveOptions::default()
    };
    let closure = resolve_closure(&fx.index, &roots, &options).unwrap();
    assert_eq!(names(&closure.packages), vec!["app", "foo-a"]);
}

#[test]
fn test_filtered_package_never_pulled_in_by_any_requirer() {
    let fx = fixture(
        &[
            TestPackage::binary("top", "x86_64", "1.0").requires(&["left", "right"]),
            TestPackage::binary("left", "x86_64", "1.0").requires(&["heavy", "left-dep"]),
            TestPackage::binary("right", "x86_64", "1.0").requires(&["heavy", "right-dep"]),
            TestPackage::binary("heavy", "x86_64", "1.0"),
            TestPackage::binary("left-dep", "x86_64", "1.0"),
            TestPackage::binary("right-dep", "noarch", "1.0"),
        ],
        &[TestPackage::source("top", "1.0")],
    );
    let options = ResolveOptions {
        filters: ["heavy".to_string()].into_iter().collect(),
        ..ResolveOptions::default()
    };
    let closure = resolve_closure(&fx.index, &[root(&fx.index, "top")], &options).unwrap();
    let resolved = names(&closure.packages);
    assert!(!resolved.contains(&"heavy"));
    for expected in ["top", "left", "left-dep", "right", "right-dep"] {
        assert!(resolved.contains(&expected), "{expected} missing from {resolved:?}");
    }
    assert!(closure.diagnostics.is_empty());
}

#[test]
fn test_pick_first_takes_first_provider() {
    let fx = ambiguous_provider();
    let options = ResolveOptions {
        pick_first: true,
        ..ResolveOptions::default()
    };
    let closure = resolve_closure(&fx.index, &[root(&fx.index, "pkg-a")], &options).unwrap();
    assert_eq!(names(&closure.packages), vec!["pkg-a", "foo-1"]);
}

fn build_chain() -> Fixture {
    fixture(
        &[
            TestPackage::binary("a", "x86_64", "1.0").requires(&["b"]),
            TestPackage::binary("b", "x86_64", "1.0"),
            TestPackage::binary("c", "x86_64", "1.0").requires(&["d"]),
            TestPackage::binary("d", "noarch", "1.0"),
        ],
        &[
            TestPackage::source("a", "1.0").requires(&["c"]),
            TestPackage::source("b", "1.0"),
            TestPackage::source("c", "1.0"),
            TestPackage::source("d", "1.0"),
        ],
    )
}

#[test]
fn test_neededby_with_sources_and_output() {
    let fx = build_chain();
    let closure = resolve_closure(&fx.index, &[root(&fx.index, "a")], &ResolveOptions::default()).unwrap();
    assert_eq!(names(&closure.packages), vec!["a", "b"]);

    let sources = source_packages(&fx.index, &closure.packages).unwrap();
    assert!(sources.iter().all(|p| p.repo == "test-source"));

    let out = TempDir::new().unwrap();
    let files = OutputFiles {
        binary_short: out.path().join("binaries-short.txt"),
        binary_full: out.path().join("binaries-full.txt"),
        source_short: out.path().join("sources-short.txt"),
        source_full: out.path().join("sources-full.txt"),
    };
    write_results(&closure.packages, &sources, fx.index.arch(), &files).unwrap();
    assert_eq!(fs::read_to_string(&files.binary_short).unwrap(), "a\nb\n");
    assert_eq!(
        fs::read_to_string(&files.binary_full).unwrap(),
        "0:a-1.0-1.x86_64\n0:b-1.0-1.x86_64\n"
    );
    assert_eq!(fs::read_to_string(&files.source_full).unwrap(), "0:a-1.0-1.src\n0:b-1.0-1.src\n");
}

#[test]
fn test_selfhost_traversal() {
    let fx = build_chain();
    let plan = resolve_selfhost(&fx.index, &[root(&fx.index, "a")], &ResolveOptions::default()).unwrap();
    assert_eq!(names(&plan.binaries), vec!["a", "b", "c", "d"]);
    assert_eq!(names(&plan.sources), vec!["a", "b", "c", "d"]);
    assert!(plan.ambiguities.is_empty());
}

#[test]
fn test_selfhost_with_solver_reaches_same_set() {
    let fx = build_chain();
    let mut solver = GreedySolver::new(&fx.index);
    let plan = resolve_with_solver(&fx.index, &mut solver, &["a".to_string()], true).unwrap();

    let mut binaries = names(&plan.binaries);
    binaries.sort_unstable();
    assert_eq!(binaries, vec!["a", "b", "c", "d"]);
    let mut sources = names(&plan.sources);
    sources.sort_unstable();
    assert_eq!(sources, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_solver_contradiction_on_unbuildable_source() {
    let fx = fixture(
        &[TestPackage::binary("a", "x86_64", "1.0")],
        &[TestPackage::source("a", "1.0").requires(&["no-such-compiler"])],
    );
    let mut solver = GreedySolver::new(&fx.index);
    let err = resolve_with_solver(&fx.index, &mut solver, &["a".to_string()], true).unwrap_err();
    match err {
        Error::SolverContradiction { problems } => {
            assert!(problems.iter().any(|p| p.contains("no-such-compiler")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_override_priority_beats_newer_version() {
    let base = TempDir::new().unwrap();
    let over = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    write_repo(base.path(), &[TestPackage::binary("tool", "x86_64", "2.0")]);
    write_repo(over.path(), &[TestPackage::binary("tool", "x86_64", "1.5")]);

    let descriptors = vec![
        RepoDescriptor::new("base", base.path().display().to_string()),
        RepoDescriptor::new("override", over.path().display().to_string()).with_priority(OVERRIDE_PRIORITY),
    ];
    let index = load_index(
        &descriptors,
        ArchPolicy::new("x86_64"),
        Rc::new(LocalFetcher),
        RepoCache::new(cache.path()),
    )
    .unwrap();

    let providers = index.whatprovides(&Capability::new("tool")).unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].version(), "1.5");
    assert_eq!(providers[0].repo, "override");
}

#[test]
fn test_solver_selfhost_with_local_override() {
    let base = TempDir::new().unwrap();
    let base_src = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    write_repo(
        base.path(),
        &[
            TestPackage::binary("a", "x86_64", "1.0").requires(&["b"]),
            TestPackage::binary("b", "x86_64", "1.0"),
        ],
    );
    write_repo(base_src.path(), &[TestPackage::source("a", "1.0"), TestPackage::source("b", "1.0")]);
    // Rebuilt locally from the unchanged source
    write_repo(local.path(), &[TestPackage::binary("b", "x86_64", "1.0")]);

    let descriptors = vec![
        RepoDescriptor::new("base", base.path().display().to_string()),
        RepoDescriptor::new("base-source", base_src.path().display().to_string()),
        RepoDescriptor::new("depchase-local-override", local.path().display().to_string())
            .with_priority(OVERRIDE_PRIORITY),
    ];
    let index = load_index(
        &descriptors,
        ArchPolicy::new("x86_64"),
        Rc::new(LocalFetcher),
        RepoCache::new(cache.path()),
    )
    .unwrap();

    let mut solver = GreedySolver::new(&index);
    let plan = resolve_with_solver(&index, &mut solver, &["a".to_string()], true).unwrap();
    let b = plan.binaries.iter().find(|p| p.name == "b").unwrap();
    assert_eq!(b.repo, "depchase-local-override");
    let mut sources = names(&plan.sources);
    sources.sort_unstable();
    assert_eq!(sources, vec!["a", "b"]);
    assert!(plan.sources.iter().all(|p| p.repo == "base-source"));
}

#[test]
fn test_multiarch_provider_short_name() {
    let fx = fixture(
        &[
            TestPackage::binary("app", "x86_64", "1.0").requires(&["libcompat.so.1"]),
            TestPackage::binary("compat", "i686", "1.0").provides(&["libcompat.so.1"]),
        ],
        &[TestPackage::source("app", "1.0"), TestPackage::source("compat", "1.0")],
    );
    let closure = resolve_closure(&fx.index, &[root(&fx.index, "app")], &ResolveOptions::default()).unwrap();
    let short: Vec<String> = closure
        .packages
        .iter()
        .map(|p| depchase::output::binary_short_name(p, fx.index.arch()))
        .collect();
    assert_eq!(short, vec!["app", "compat#i686"]);
}
