//! In-memory registry and broker used by unit tests.

use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::{PackageRegistry, ShareBroker, ShareRequest};
use crate::error::AppError;
use crate::types::PackageMeta;

pub fn meta(id: &str, system: bool) -> PackageMeta {
    PackageMeta {
        package_id: id.to_string(),
        label: id.rsplit('.').next().unwrap_or(id).to_string(),
        version_name: "1.0".to_string(),
        version_code: 1,
        installer_path: PathBuf::from(format!("/data/app/{}/base.apk", id)),
        data_dir: PathBuf::from(format!("/data/user/0/{}", id)),
        uid: 10_000,
        system,
    }
}

pub struct StaticRegistry {
    packages: Vec<PackageMeta>,
    failure: Option<String>,
    delay: Duration,
}

impl StaticRegistry {
    pub fn new(packages: Vec<PackageMeta>) -> Self {
        Self {
            packages,
            failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            packages: Vec::new(),
            failure: Some(msg.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn check(&self) -> Result<(), AppError> {
        thread::sleep(self.delay);
        match &self.failure {
            Some(msg) => Err(AppError::RegistryFailure(msg.clone())),
            None => Ok(()),
        }
    }
}

impl PackageRegistry for StaticRegistry {
    fn installed_packages(&self) -> Result<Vec<PackageMeta>, AppError> {
        self.check()?;
        Ok(self.packages.clone())
    }

    fn package(&self, package_id: &str) -> Result<Option<PackageMeta>, AppError> {
        self.check()?;
        Ok(self.packages.iter().find(|p| p.package_id == package_id).cloned())
    }
}

#[derive(Default)]
pub struct RecordingBroker {
    pub requests: Mutex<Vec<ShareRequest>>,
    pub reject: Option<String>,
}

impl RecordingBroker {
    pub fn rejecting(msg: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject: Some(msg.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<ShareRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ShareBroker for RecordingBroker {
    fn share(&self, request: &ShareRequest) -> Result<(), AppError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reject {
            Some(msg) => Err(AppError::BrokerFailure(msg.clone())),
            None => Ok(()),
        }
    }
}
