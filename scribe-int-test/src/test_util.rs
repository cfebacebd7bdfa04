use log::LevelFilter;
use scribe::common::{ConsoleLogger, LogLevel};
use scribe::errors::ScribeResult;
use scribe::scribe::Scribe;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Arc, Once};

static INIT_LOGGING: Once = Once::new();

/// Installs the console log backend once per test binary.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = colog::default_builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// Runs `test` against the context produced by `before`, always running
/// `after` so temp directories are cleaned up even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> ScribeResult<()>,
    B: Fn() -> ScribeResult<TestContext>,
    A: Fn(TestContext) -> ScribeResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_ctx = ctx.clone();
    let result = std::panic::catch_unwind(AssertUnwindSafe(move || test(test_ctx)));

    if let Err(e) = after(ctx) {
        eprintln!("Warning: After run failed: {:?}", e);
    }

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    db: Scribe,
}

impl TestContext {
    pub fn new(path: String, db: Scribe) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn db(&self) -> Scribe {
        self.db.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_string_lossy().into_owned()
}

pub fn create_test_context() -> ScribeResult<TestContext> {
    init_logging();

    let path = random_path();
    let db = Scribe::builder()
        .logger(Arc::new(ConsoleLogger::new(LogLevel::Debug)))
        .sync_writes(false)
        .open(&path)?;
    Ok(TestContext::new(path, db))
}

pub fn cleanup(ctx: TestContext) -> ScribeResult<()> {
    let path = Path::new(ctx.path());
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub age: String,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

pub fn user(name: &str, age: &str, city: &str) -> User {
    User {
        name: name.to_string(),
        age: age.to_string(),
        contact: "1234567890".to_string(),
        company: "samsung".to_string(),
        address: Address {
            city: city.to_string(),
            state: "karnataka".to_string(),
            country: "India".to_string(),
            pincode: "560037".to_string(),
        },
    }
}
