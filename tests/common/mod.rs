#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;

    /// Write `content` to `config.yaml` inside a fresh temp dir.
    ///
    /// The directory is removed when the returned guard drops.
    pub fn create_temp_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }
}

pub mod handlers {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use actiondispatch::{
        ActionContext, ActionInvoker, ActionResult, AfterInterceptor, CorsSpec,
    };
    use serde_json::{json, Value};

    /// Interceptor that appends its name to an array body and counts destroys
    pub struct Recorder {
        pub name: &'static str,
        pub priority: i32,
        pub cors: CorsSpec,
        pub destroyed: Arc<AtomicUsize>,
    }

    impl Recorder {
        pub fn new(name: &'static str, priority: i32) -> Self {
            Self {
                name,
                priority,
                cors: CorsSpec::DUMB,
                destroyed: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_cors(mut self, cors: CorsSpec) -> Self {
            self.cors = cors;
            self
        }
    }

    impl AfterInterceptor for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn handle(&self, mut result: ActionResult, _ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
            if let Value::Array(items) = &mut result.body {
                items.push(json!(self.name));
            }
            Ok(result)
        }
        fn cors_spec(&self) -> &CorsSpec {
            &self.cors
        }
        fn session_free(&self) -> bool {
            true
        }
        fn express(&self) -> bool {
            true
        }
        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Invoker that counts calls and destroys
    pub struct CountingInvoker {
        pub name: &'static str,
        pub cors: CorsSpec,
        pub calls: Arc<AtomicUsize>,
        pub destroyed: Arc<AtomicUsize>,
    }

    impl CountingInvoker {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                cors: CorsSpec::DUMB,
                calls: Arc::new(AtomicUsize::new(0)),
                destroyed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ActionInvoker for CountingInvoker {
        fn name(&self) -> &str {
            self.name
        }
        fn handle(&self, _ctx: &mut ActionContext) -> anyhow::Result<ActionResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(ActionResult::ok(json!([n])))
        }
        fn cors_spec(&self) -> &CorsSpec {
            &self.cors
        }
        fn session_free(&self) -> bool {
            true
        }
        fn express(&self) -> bool {
            true
        }
        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
