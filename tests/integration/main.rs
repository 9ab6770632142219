//! Integration tests for pkglink

use pkglink::bundle::{
    DeclarationKind, LinkedLibrary, PackageBundleAssembler, UnlinkedDeclaration, UnlinkedImport,
    UnlinkedUnit,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// On-disk project with packages, their bundles and a config file
struct Project {
    dir: TempDir,
    packages: Vec<String>,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            packages: Vec::new(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn source_dir(&self, name: &str) -> PathBuf {
        self.root().join(name).join("lib")
    }

    fn output_dir(&self, name: &str) -> PathBuf {
        self.root().join(name).join("out")
    }

    fn bundle_path(&self, name: &str) -> PathBuf {
        self.output_dir(name).join(format!("{name}.full.ds"))
    }

    /// Package `name` with unit `<name>.src` importing `imports`
    fn package(&mut self, name: &str, imports: &[&str], refs: &[&str]) -> &mut Self {
        let source = format!("class {} {{}}\n", name.to_uppercase());
        fs::create_dir_all(self.source_dir(name)).unwrap();
        fs::create_dir_all(self.output_dir(name)).unwrap();
        fs::write(self.source_dir(name).join(format!("{name}.src")), &source).unwrap();

        let unit = UnlinkedUnit {
            imports: std::iter::once(UnlinkedImport::implicit("sdk:core"))
                .chain(imports.iter().map(|uri| UnlinkedImport::new(*uri)))
                .collect(),
            declarations: vec![UnlinkedDeclaration::new(
                name.to_uppercase(),
                DeclarationKind::Class,
            )
            .referencing(refs.iter().copied())],
            ..UnlinkedUnit::default()
        };
        let mut assembler = PackageBundleAssembler::new();
        assembler.add_unlinked_unit(format!("package:{name}/{name}.src"), &source, unit);
        fs::write(self.bundle_path(name), assembler.assemble().to_bytes().unwrap()).unwrap();

        self.packages.push(name.to_string());
        self
    }

    fn write_sdk(&self) -> PathBuf {
        let mut assembler = PackageBundleAssembler::new();
        assembler.add_linked_library(
            "sdk:core",
            LinkedLibrary {
                exported_names: BTreeMap::from([("Object".to_string(), "sdk:core".to_string())]),
                ..LinkedLibrary::default()
            },
        );
        let path = self.root().join("sdk.full.ds");
        fs::write(&path, assembler.assemble().to_bytes().unwrap()).unwrap();
        path
    }

    fn write_config(&self) -> PathBuf {
        let mut config = format!(
            "[sdk]\nbundle = {:?}\n\n[link]\nstrong_mode = true\n",
            self.write_sdk().display().to_string()
        );
        for name in &self.packages {
            config.push_str(&format!(
                "\n[packages.{name}]\nsource = {:?}\noutput = {:?}\n",
                self.source_dir(name).display().to_string(),
                self.output_dir(name).display().to_string(),
            ));
        }
        let path = self.root().join("config.toml");
        fs::write(&path, config).unwrap();
        path
    }
}

fn chain() -> Project {
    let mut project = Project::new();
    project
        .package("base", &[], &["Object"])
        .package("http", &["package:base/base.src"], &["BASE"])
        .package("app", &["package:http/http.src"], &["HTTP"]);
    project
}

mod cli_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn pkglink(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("pkglink");
        cmd.arg("--no-local").arg("--config").arg(config);
        cmd
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("pkglink")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Incremental package linker"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("pkglink")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pkglink"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        pkglink(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        pkglink(&temp.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("strong_mode = true"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        pkglink(&path).args(["config", "init"]).assert().success();
        assert!(path.is_file());

        pkglink(&path)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[link\n").unwrap();
        pkglink(&path)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn link_prints_closure_as_json() {
        let project = chain();
        let config = project.write_config();

        pkglink(&config)
            .args(["link", "package:app/app.src", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("base.full.ds"))
            .stdout(predicate::str::contains("http.full.ds"))
            .stdout(predicate::str::contains("app.full.ds"))
            .stdout(predicate::str::contains("\"linked\": true"));
    }

    #[test]
    fn link_plain_lists_only_needed_packages() {
        let mut project = chain();
        project.package("unrelated", &[], &[]);
        let config = project.write_config();

        pkglink(&config)
            .args(["link", "package:http/http.src", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("base.full.ds"))
            .stdout(predicate::str::contains("app.full.ds").not())
            .stdout(predicate::str::contains("unrelated.full.ds").not());
    }

    #[test]
    fn link_unknown_uri_fails() {
        let project = chain();
        let config = project.write_config();

        pkglink(&config)
            .args(["link", "package:missing/missing.src"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No package provides"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn link_with_unresolvable_import_fails() {
        let mut project = Project::new();
        project.package("app", &["package:ghost/ghost.src"], &[]);
        let config = project.write_config();

        pkglink(&config)
            .args(["link", "package:app/app.src"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot link package:app/app.src"));
    }

    #[test]
    fn stale_source_hides_bundle() {
        let project = chain();
        let config = project.write_config();
        fs::write(
            project.source_dir("base").join("base.src"),
            "class BASE { int edited; }\n",
        )
        .unwrap();

        pkglink(&config)
            .args(["show", "package:base/base.src"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No package provides"));

        pkglink(&config)
            .args(["link", "package:app/app.src"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot link"));
    }

    #[test]
    fn show_describes_unit() {
        let project = chain();
        let config = project.write_config();

        pkglink(&config)
            .args(["show", "package:http/http.src"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http.full.ds"))
            .stdout(predicate::str::contains("package:base/base.src"))
            .stdout(predicate::str::contains("HTTP"));
    }

    #[test]
    fn scan_lists_bundles() {
        let project = chain();
        let config = project.write_config();

        pkglink(&config)
            .arg("scan")
            .arg(project.output_dir("http"))
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http.full.ds"));
    }

    #[test]
    fn scan_missing_folder_fails() {
        let project = chain();
        let config = project.write_config();

        pkglink(&config)
            .arg("scan")
            .arg(project.root().join("nope"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }
}

mod provider_tests {
    use super::*;
    use pkglink::link::{LinkOptions, LinkedPackageProvider, SummaryLinker};
    use pkglink::resolver::PackageMap;
    use pkglink::resource::PhysicalResourceProvider;

    fn provider(project: &Project) -> LinkedPackageProvider {
        let mut packages = PackageMap::new();
        for name in &project.packages {
            packages.insert(name, project.source_dir(name), project.output_dir(name));
        }
        LinkedPackageProvider::new(
            Box::new(PhysicalResourceProvider),
            Box::new(packages),
            Box::new(SummaryLinker),
            pkglink::bundle::PackageBundle::default(),
            LinkOptions::default(),
        )
    }

    #[test]
    fn links_closure_from_disk() {
        let project = chain();
        let mut provider = provider(&project);

        let packages = provider
            .linked_packages("package:app/app.src")
            .unwrap()
            .unwrap();
        assert_eq!(packages.len(), 3);

        let app = packages
            .iter()
            .find(|p| p.location() == project.bundle_path("app"))
            .unwrap();
        let record = app
            .linked()
            .and_then(|bundle| bundle.linked_library("package:app/app.src"))
            .unwrap();
        assert!(record
            .dependencies
            .contains(&"package:http/http.src".to_string()));
        assert_eq!(
            record.references[0].target.as_deref(),
            Some("package:http/http.src")
        );
    }

    #[test]
    fn disk_changes_after_scan_are_not_seen() {
        let project = chain();
        let mut provider = provider(&project);

        assert!(provider.unlinked_for_uri("package:base/base.src").is_some());
        fs::write(project.source_dir("base").join("base.src"), "changed").unwrap();

        // Folder already scanned; the cached package is served as is
        assert!(provider.unlinked_for_uri("package:base/base.src").is_some());
        assert!(provider
            .linked_packages("package:app/app.src")
            .unwrap()
            .is_some());
    }

    #[test]
    fn foreign_files_in_output_folder_are_ignored() {
        let project = chain();
        fs::write(project.output_dir("base").join("notes.txt"), "hello").unwrap();
        fs::write(project.output_dir("base").join("broken.FULL.DS"), "{not json").unwrap();

        let mut provider = provider(&project);
        let packages = provider.packages_in_folder(&project.output_dir("base"));
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].location(), project.bundle_path("base"));
    }
}
