// Android device access through the adb command line tool.
// AdbRegistry : package enumeration and lookup via "dumpsys package"
// DevicePushBroker : "share" by pushing the staged APK to the device's Download folder

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, error, info};

use super::{PackageRegistry, ShareBroker, ShareRequest};
use crate::error::AppError;
use crate::export::ShareProvider;
use crate::types::PackageMeta;

const DEVICE_DOWNLOADS: &str = "/sdcard/Download";

/// Thin wrapper around the adb binary, optionally pinned to one device serial.
#[derive(Clone, Debug)]
pub struct Adb {
    program: String,
    serial: Option<String>,
}

impl Adb {
    pub fn new(program: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            program: program.into(),
            serial,
        }
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Run `adb [-s serial] <args>` and return stdout.
    pub fn run(&self, args: &[&str]) -> std::io::Result<String> {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.args(args);
        debug!("Running {} {:?}", self.program, args);

        let output = cmd.output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let err = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("ADB command failed: {}", err);
            Err(std::io::Error::other(err))
        }
    }
}

/// Package registry backed by a device's package manager dump.
pub struct AdbRegistry {
    adb: Adb,
    mirror_dir: PathBuf,
}

impl AdbRegistry {
    /// `mirror_dir` receives local copies of installers pulled from the device.
    pub fn new(adb: Adb, mirror_dir: PathBuf) -> Self {
        Self { adb, mirror_dir }
    }

    /// Only the most recently resolved installer is kept in the mirror.
    fn pull_installer(&self, meta: &PackageMeta) -> Result<PathBuf, AppError> {
        if self.mirror_dir.exists() {
            fs::remove_dir_all(&self.mirror_dir).map_err(|e| AppError::io(&self.mirror_dir, e))?;
        }
        fs::create_dir_all(&self.mirror_dir).map_err(|e| AppError::io(&self.mirror_dir, e))?;
        let local = self.mirror_dir.join(format!("{}.apk", meta.package_id));
        let remote = meta.installer_path.to_string_lossy();
        let local_s = local.to_string_lossy();

        self.adb
            .run(&["pull", remote.as_ref(), local_s.as_ref()])
            .map_err(|e| AppError::io(&meta.installer_path, e))?;
        debug!(package = %meta.package_id, local = %local.display(), "Pulled installer");
        Ok(local)
    }
}

impl PackageRegistry for AdbRegistry {
    fn installed_packages(&self) -> Result<Vec<PackageMeta>, AppError> {
        let text = self
            .adb
            .run(&["shell", "dumpsys", "package", "packages"])
            .map_err(|e| AppError::RegistryFailure(e.to_string()))?;
        debug!("Received {} bytes of package data", text.len());
        let packages = parse_dumpsys(&text);
        info!("Parsed {} packages", packages.len());
        Ok(packages)
    }

    fn package(&self, package_id: &str) -> Result<Option<PackageMeta>, AppError> {
        // adb shell joins arguments into a remote command line
        if !is_valid_package_id(package_id) {
            return Ok(None);
        }
        let text = self
            .adb
            .run(&["shell", "dumpsys", "package", package_id])
            .map_err(|e| AppError::RegistryFailure(e.to_string()))?;

        let Some(mut meta) = parse_dumpsys(&text)
            .into_iter()
            .find(|p| p.package_id == package_id)
        else {
            return Ok(None);
        };
        meta.installer_path = self.pull_installer(&meta)?;
        Ok(Some(meta))
    }
}

/// Share target that copies the staged file into the device's Download folder.
pub struct DevicePushBroker {
    adb: Adb,
    provider: Arc<ShareProvider>,
}

impl DevicePushBroker {
    pub fn new(adb: Adb, provider: Arc<ShareProvider>) -> Self {
        Self { adb, provider }
    }
}

impl ShareBroker for DevicePushBroker {
    fn share(&self, request: &ShareRequest) -> Result<(), AppError> {
        let path = self
            .provider
            .open(&request.handle)
            .ok_or_else(|| AppError::BrokerFailure(format!("unknown handle {}", request.handle)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::BrokerFailure("staged file has no name".into()))?;
        let remote = format!("{}/{}", DEVICE_DOWNLOADS, name);
        let local = path.to_string_lossy();

        self.adb
            .run(&["push", local.as_ref(), &remote])
            .map_err(|e| AppError::BrokerFailure(e.to_string()))?;
        info!(mime = request.mime, %remote, "Pushed package to device");
        Ok(())
    }
}

pub fn is_valid_package_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn package_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)Package \[([^\]]+)\]").expect("static regex"))
}

#[derive(Default)]
struct PendingPackage {
    id: String,
    indent: usize,
    uid: Option<u32>,
    code_path: Option<String>,
    version_code: Option<i64>,
    version_name: Option<String>,
    data_dir: Option<String>,
    system: bool,
}

impl PendingPackage {
    fn read_line(&mut self, line: &str) {
        let set = |slot: &mut Option<String>, value: &str| {
            if slot.is_none() {
                *slot = Some(value.trim().to_string());
            }
        };
        let first_token = |value: &str| value.split_whitespace().next().unwrap_or("").to_string();

        if let Some(v) = line.strip_prefix("userId=").or_else(|| line.strip_prefix("appId=")) {
            if self.uid.is_none() {
                self.uid = first_token(v).parse().ok();
            }
        } else if let Some(v) = line.strip_prefix("codePath=") {
            set(&mut self.code_path, v);
        } else if let Some(v) = line.strip_prefix("versionCode=") {
            if self.version_code.is_none() {
                self.version_code = first_token(v).parse().ok();
            }
        } else if let Some(v) = line.strip_prefix("versionName=") {
            set(&mut self.version_name, v);
        } else if let Some(v) = line.strip_prefix("dataDir=") {
            set(&mut self.data_dir, v);
        } else if let Some(v) = line.strip_prefix("flags=[").or_else(|| line.strip_prefix("pkgFlags=[")) {
            let flags = v.trim_end_matches(']');
            if flags.split_whitespace().any(|f| f == "SYSTEM") {
                self.system = true;
            }
        }
    }

    fn finish(self) -> PackageMeta {
        let installer_path = match self.code_path {
            Some(p) if p.ends_with(".apk") => PathBuf::from(p),
            Some(p) => Path::new(&p).join("base.apk"),
            None => PathBuf::new(),
        };
        let data_dir = self
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("/data/user/0/{}", self.id)));
        PackageMeta {
            label: self.id.clone(),
            version_name: self.version_name.unwrap_or_default(),
            version_code: self.version_code.unwrap_or(0),
            installer_path,
            data_dir,
            uid: self.uid.unwrap_or(0),
            system: self.system,
            package_id: self.id,
        }
    }
}

/// Parse the `Package [id]` blocks of a `dumpsys package` dump.
///
/// Input looks like:
///   Packages:
///     Package [com.termux] (5b2e1f0):
///       userId=10234
///       codePath=/data/app/~~x==/com.termux-y==
///       versionCode=118 minSdk=24 targetSdk=28
///       versionName=0.118.0
///       flags=[ HAS_CODE ALLOW_CLEAR_USER_DATA ALLOW_BACKUP ]
///       dataDir=/data/user/0/com.termux
pub fn parse_dumpsys(text: &str) -> Vec<PackageMeta> {
    let mut res = Vec::new();
    let mut current: Option<PendingPackage> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("Hidden system packages:") {
            break;
        }
        if let Some(caps) = package_header().captures(line) {
            if let Some(done) = current.take() {
                res.push(done.finish());
            }
            current = Some(PendingPackage {
                id: caps[2].to_string(),
                indent: caps[1].len(),
                ..Default::default()
            });
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        match current.take() {
            Some(mut pkg) if indent > pkg.indent => {
                pkg.read_line(trimmed);
                current = Some(pkg);
            }
            Some(done) => res.push(done.finish()),
            None => {}
        }
    }
    if let Some(done) = current.take() {
        res.push(done.finish());
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
Database versions:
  Internal:
    sdkVersion=33 databaseVersion=3

Packages:
  Package [com.termux] (5b2e1f0):
    userId=10234
    pkg=Package{c1d2 com.termux}
    codePath=/data/app/~~Ab==/com.termux-Cd==
    versionCode=118 minSdk=24 targetSdk=28
    versionName=0.118.0
    flags=[ HAS_CODE ALLOW_CLEAR_USER_DATA ALLOW_BACKUP ]
    privateFlags=[ PRIVATE_FLAG_ACTIVITIES_RESIZE_MODE_RESIZEABLE ]
    dataDir=/data/user/0/com.termux
    User 0: ceDataInode=4321 installed=true hidden=false
      runtime permissions:
        android.permission.POST_NOTIFICATIONS: granted=false, flags=[ SYSTEM_FIXED ]
  Package [com.android.systemui] (9a8b7c6):
    userId=10110
    codePath=/system_ext/priv-app/SystemUI
    versionCode=33 minSdk=33 targetSdk=33
    versionName=13
    flags=[ SYSTEM HAS_CODE PERSISTENT ]
  Package [org.legacy.app] (1234abc):
    userId=10300 gids=[3003]
    codePath=/data/app/org.legacy.app-1.apk
    versionCode=7 targetSdk=19
    versionName=1.0 beta
    pkgFlags=[ HAS_CODE ]

Hidden system packages:
  Package [com.android.chrome] (ffff):
    userId=10099
    flags=[ SYSTEM ]
";

    #[test]
    fn parses_user_package() {
        let pkgs = parse_dumpsys(DUMP);
        let termux = &pkgs[0];
        assert_eq!(termux.package_id, "com.termux");
        assert_eq!(termux.label, "com.termux");
        assert_eq!(termux.uid, 10234);
        assert_eq!(termux.version_code, 118);
        assert_eq!(termux.version_name, "0.118.0");
        assert_eq!(
            termux.installer_path,
            PathBuf::from("/data/app/~~Ab==/com.termux-Cd==/base.apk")
        );
        assert_eq!(termux.data_dir, PathBuf::from("/data/user/0/com.termux"));
        assert!(!termux.system, "permission flags must not mark the package as system");
    }

    #[test]
    fn detects_system_flag_and_defaults() {
        let pkgs = parse_dumpsys(DUMP);
        let ui = &pkgs[1];
        assert_eq!(ui.package_id, "com.android.systemui");
        assert!(ui.system);
        assert_eq!(ui.data_dir, PathBuf::from("/data/user/0/com.android.systemui"));
    }

    #[test]
    fn handles_legacy_layout() {
        let pkgs = parse_dumpsys(DUMP);
        let legacy = &pkgs[2];
        assert_eq!(legacy.uid, 10300);
        assert_eq!(legacy.installer_path, PathBuf::from("/data/app/org.legacy.app-1.apk"));
        assert_eq!(legacy.version_name, "1.0 beta");
        assert!(!legacy.system);
    }

    #[test]
    fn stops_at_hidden_system_packages() {
        let pkgs = parse_dumpsys(DUMP);
        assert_eq!(pkgs.len(), 3);
        assert!(pkgs.iter().all(|p| p.package_id != "com.android.chrome"));
    }

    #[test]
    fn unknown_package_dump_is_empty() {
        assert!(parse_dumpsys("Unable to find package: nope.pkg\n").is_empty());
    }

    /// Stand-in for adb: answers `shell dumpsys package <id>` and `pull <remote> <local>`.
    #[cfg(unix)]
    fn fake_adb(dir: &Path) -> Adb {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("adb");
        fs::write(
            &script,
            r#"#!/bin/sh
case "$1" in
  shell)
    printf 'Packages:\n  Package [%s] (abc):\n    userId=10001\n    codePath=/data/app/%s\n    versionCode=1\n    versionName=1.0\n    flags=[ HAS_CODE ]\n' "$4" "$4"
    ;;
  pull)
    printf 'PK' > "$3"
    ;;
esac
"#,
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        Adb::new(script.to_string_lossy(), None)
    }

    #[cfg(unix)]
    #[test]
    fn mirror_keeps_only_latest_installer() {
        let dir = tempfile::TempDir::new().unwrap();
        let mirror = dir.path().join("mirror");
        let registry = AdbRegistry::new(fake_adb(dir.path()), mirror.clone());

        for id in ["com.a", "com.b", "com.c"] {
            let meta = registry.package(id).unwrap().expect("fake adb knows every id");
            assert_eq!(meta.installer_path, mirror.join(format!("{}.apk", id)));
            assert_eq!(fs::read(&meta.installer_path).unwrap(), b"PK");
        }

        let left: Vec<_> = fs::read_dir(&mirror)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(left, vec!["com.c.apk".to_string()]);
    }

    #[test]
    fn package_id_validation() {
        assert!(is_valid_package_id("com.example_app.v2"));
        assert!(!is_valid_package_id(""));
        assert!(!is_valid_package_id("com.x; reboot"));
    }
}
