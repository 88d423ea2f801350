use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tews::{Architecture, BuildConfig, BuildTarget, LIBRARIES};

fn tews(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tews").unwrap();
    cmd.current_dir(root)
        .env("NO_COLOR", "1")
        .env_remove("TEWS_ROOT")
        .env_remove("TEWS_BUILD_CONFIG")
        .env_remove("TEWS_ARCH")
        .env_remove("TEWS_SHADERC_SHA256");
    cmd
}

fn debug_x64() -> BuildTarget {
    BuildTarget::new(BuildConfig::Debug, Architecture::X64)
}

fn module_dir(root: &Path, module: &str) -> PathBuf {
    debug_x64().bin_dir(root, module).unwrap()
}

/// Lays out build outputs for every declared library.
fn write_library_outputs(root: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for library in LIBRARIES {
        let dir = debug_x64().bin_dir(root, library.name).unwrap();
        fs::create_dir_all(&dir).unwrap();
        for dll in library.dll_names(Architecture::X64).unwrap() {
            fs::write(dir.join(&dll), format!("{}/{dll}", library.name)).unwrap();
            names.push(dll);
        }
    }
    names
}

fn module_dirs(root: &Path) -> Vec<String> {
    let parent = root.join("Binaries/Build/Debug/x64");
    let library_names: Vec<&str> = LIBRARIES.iter().map(|library| library.name).collect();
    let mut dirs: Vec<String> = fs::read_dir(parent)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| !library_names.contains(&name.as_str()))
        .collect();
    dirs.sort();
    dirs
}

fn write_script(root: &Path, name: &str, body: &str) {
    let scripts = root.join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::write(scripts.join(name), body).unwrap();
}

#[test]
fn test_help_output() {
    let temp = TempDir::new().unwrap();
    tews(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("updateLibs"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_missing_verb_prints_usage() {
    let temp = TempDir::new().unwrap();
    tews(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_verb_fails() {
    let temp = TempDir::new().unwrap();
    tews(temp.path()).arg("build").assert().code(2);
}

#[test]
fn test_creates_default_workspace_config() {
    let temp = TempDir::new().unwrap();
    tews(temp.path()).arg("modules").assert().success();

    let contents = fs::read_to_string(temp.path().join("workspace.json")).unwrap();
    assert_eq!(contents, "{\n  \"modules\": []\n}\n");
}

#[test]
fn test_update_libs_with_empty_config_targets_core_modules() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("workspace.json"), r#"{"modules": []}"#).unwrap();
    let dlls = write_library_outputs(temp.path());

    tews(temp.path())
        .arg("updateLibs")
        .assert()
        .success()
        .stdout(predicate::str::contains("PhysX_64.dll to MinecraftEditor"))
        .stdout(predicate::str::contains("2 module(s)"));

    assert_eq!(module_dirs(temp.path()), vec!["MinecraftEditor", "MinecraftGame"]);
    for module in ["MinecraftGame", "MinecraftEditor"] {
        for dll in &dlls {
            assert!(module_dir(temp.path(), module).join(dll).is_file(), "{module}/{dll}");
        }
    }
}

#[test]
fn test_update_libs_includes_configured_modules() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("workspace.json"), r#"{"modules": ["ModA"]}"#).unwrap();
    let dlls = write_library_outputs(temp.path());

    tews(temp.path())
        .arg("updateLibs")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 module(s)"));

    assert_eq!(
        module_dirs(temp.path()),
        vec!["MinecraftEditor", "MinecraftGame", "ModA"]
    );

    let expected: Vec<Vec<u8>> = dlls
        .iter()
        .map(|dll| fs::read(module_dir(temp.path(), "MinecraftGame").join(dll)).unwrap())
        .collect();
    for module in ["MinecraftEditor", "ModA"] {
        let actual: Vec<Vec<u8>> = dlls
            .iter()
            .map(|dll| fs::read(module_dir(temp.path(), module).join(dll)).unwrap())
            .collect();
        assert_eq!(actual, expected, "{module}");
    }
}

#[test]
fn test_update_libs_reports_missing_library() {
    let temp = TempDir::new().unwrap();

    tews(temp.path())
        .arg("update-libs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PhysX"))
        .stderr(predicate::str::contains("PhysXCommon_64.dll"));

    // Module directories are created before any copy is attempted.
    assert!(module_dir(temp.path(), "MinecraftGame").is_dir());
}

#[test]
fn test_update_libs_honours_root_and_target_options() {
    let temp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let target = BuildTarget::new(BuildConfig::Release, Architecture::X86);
    for library in LIBRARIES {
        let dir = target.bin_dir(temp.path(), library.name).unwrap();
        fs::create_dir_all(&dir).unwrap();
        for dll in library.dll_names(Architecture::X86).unwrap() {
            fs::write(dir.join(dll), "x86").unwrap();
        }
    }

    tews(elsewhere.path())
        .arg("--root")
        .arg(temp.path())
        .args(["--config", "release", "--arch", "32", "updateLibs"])
        .assert()
        .success();

    let game = target.bin_dir(temp.path(), "MinecraftGame").unwrap();
    assert!(game.join("PhysX_32.dll").is_file());
    assert!(game.join("libssl-1_1-x32.dll").is_file());
    assert!(!elsewhere.path().join("workspace.json").exists());
}

#[test]
fn test_modules_add_then_update_libs() {
    let temp = TempDir::new().unwrap();
    write_library_outputs(temp.path());

    tews(temp.path())
        .args(["modules", "add", "ModB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("module 'ModB'"));

    let contents = fs::read_to_string(temp.path().join("workspace.json")).unwrap();
    assert!(contents.contains("\"ModB\""));

    tews(temp.path())
        .args(["modules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MinecraftGame"))
        .stdout(predicate::str::contains("ModB"));

    tews(temp.path()).arg("updateLibs").assert().success();
    assert!(module_dir(temp.path(), "ModB").join("GameNetworkingSockets.dll").is_file());

    tews(temp.path())
        .args(["modules", "remove", "ModB"])
        .assert()
        .success();
    tews(temp.path())
        .args(["modules", "remove", "ModB"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not listed"));
}

#[test]
fn test_modules_add_rejects_path_names() {
    let temp = TempDir::new().unwrap();
    tews(temp.path())
        .args(["modules", "add", "../Escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path separators"));
}

#[test]
fn test_library_named_module_leaves_sources_intact() {
    let temp = TempDir::new().unwrap();
    write_library_outputs(temp.path());

    tews(temp.path())
        .args(["modules", "add", "OpenSSL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("third-party library"));

    // A hand-edited config is caught before any copy.
    fs::write(
        temp.path().join("workspace.json"),
        r#"{"modules": ["GameNetworkingSockets"]}"#,
    )
    .unwrap();
    tews(temp.path())
        .arg("updateLibs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("shares its binary directory"));

    let source = module_dir(temp.path(), "GameNetworkingSockets").join("GameNetworkingSockets.dll");
    assert_eq!(
        fs::read_to_string(source).unwrap(),
        "GameNetworkingSockets/GameNetworkingSockets.dll"
    );
}

#[test]
#[cfg(unix)]
fn test_setup_runs_scripts_in_order() {
    let temp = TempDir::new().unwrap();
    for script in ["physx-build.sh", "gns-setup.sh", "gns-build.sh", "assimp-build.sh"] {
        write_script(
            temp.path(),
            script,
            &format!("echo \"{script} $*\" >> setup.log\necho ran {script}\n"),
        );
    }

    tews(temp.path())
        .args(["setup", "--skip-shaderc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ran gns-build.sh"))
        .stderr(predicate::str::contains("Skipped"));

    let log = fs::read_to_string(temp.path().join("setup.log")).unwrap();
    let lines: Vec<&str> = log.lines().map(str::trim_end).collect();
    assert_eq!(
        lines,
        vec![
            "physx-build.sh checked 64",
            "gns-setup.sh",
            "gns-build.sh",
            "assimp-build.sh Debug 64",
        ]
    );
}

#[test]
#[cfg(unix)]
fn test_setup_stops_at_first_failing_script() {
    let temp = TempDir::new().unwrap();
    write_script(temp.path(), "physx-build.sh", "echo physx >> setup.log\n");
    write_script(
        temp.path(),
        "gns-setup.sh",
        "echo gns-setup >> setup.log\necho 'vcpkg missing' >&2\nexit 7\n",
    );
    write_script(temp.path(), "gns-build.sh", "echo gns-build >> setup.log\n");
    write_script(temp.path(), "assimp-build.sh", "echo assimp >> setup.log\n");

    tews(temp.path())
        .args(["setup", "--skip-shaderc"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("vcpkg missing"))
        .stderr(predicate::str::contains("status 7"));

    let log = fs::read_to_string(temp.path().join("setup.log")).unwrap();
    assert_eq!(log, "physx\ngns-setup\n");
}
