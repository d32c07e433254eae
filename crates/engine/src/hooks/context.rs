//! Isolated evaluation of source scripts
//!
//! Every script runs in a fresh [`rhai::Engine`] and [`rhai::Scope`] that
//! hold only what is injected here:
//!
//! | name | value |
//! |---|---|
//! | `host` | the host state object (shared, writes are visible to the host) |
//! | `options` | the parsed invocation options (shared) |
//! | `env` | the process environment, as a map |
//! | `platform` | `#{ os, arch }` |
//! | `event` | the event being run |
//! | `script_path` | the script path as configured |
//! | `script_dir` | the directory of the script, symlinks resolved |
//!
//! Functions: `resolve(path)` resolves against `script_dir`, `sleep(ms)`
//! blocks, and `defer(ms, callback)` returns a deferred value. `import`
//! statements resolve against the script's own directory, not the working
//! directory. `print` goes to the configured stdout stream and `debug` to the
//! configured stderr stream.
//!
//! A script whose result is a deferred value has not finished: the context
//! waits for the delay, calls the callback, and keeps going while the callback
//! returns another deferred value.

use super::streams::{Role, Stream};
use crate::state::SharedValue;
use rhai::module_resolvers::FileModuleResolver;
use rhai::{AST, Dynamic, Engine, FnPtr, INT, Map, Scope};
use scriptable_core::platform::CURRENT_PLATFORM;
use scriptable_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A script result that settles later
#[derive(Debug, Clone)]
pub struct Deferred {
    delay: Duration,
    callback: FnPtr,
}

impl Deferred {
    fn new(delay_ms: INT, callback: FnPtr) -> Self {
        Self {
            delay: millis(delay_ms),
            callback,
        }
    }
}

/// Everything a script context needs from the executor
pub(crate) struct ScriptContext<'a> {
    pub path: &'a Path,
    pub event: &'a str,
    pub host: &'a SharedValue,
    pub options: &'a SharedValue,
    pub stdout: &'a Stream,
    pub stderr: &'a Stream,
    pub timeout: Option<Duration>,
}

impl ScriptContext<'_> {
    /// Load, evaluate and settle the script
    ///
    /// Returns the settled result value.
    pub fn run(&self) -> Result<Dynamic> {
        let source = fs::read_to_string(self.path).map_err(|source| Error::ScriptRead {
            path: self.path.to_path_buf(),
            source,
        })?;
        let dir = self.script_dir()?;

        let engine = self.build_engine(&dir);
        let mut ast = engine
            .compile(&source)
            .map_err(|e| Error::script(self.path, e))?;
        ast.set_source(self.path.to_string_lossy().as_ref());

        let mut scope = self.build_scope(&dir);
        tracing::debug!(script_dir = %dir.display(), "Evaluating script");

        let started = Instant::now();
        let result = engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|e| Error::script(self.path, *e))?;

        self.settle(&engine, &ast, result, started)
    }

    /// Parent directory of the symlink-resolved script path
    fn script_dir(&self) -> Result<PathBuf> {
        let resolved = fs::canonicalize(self.path).map_err(|source| Error::ScriptRead {
            path: self.path.to_path_buf(),
            source,
        })?;
        Ok(resolved
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf))
    }

    fn build_engine(&self, dir: &Path) -> Engine {
        let mut engine = Engine::new();

        let mut resolver = FileModuleResolver::new_with_path(dir.to_path_buf());
        resolver.enable_cache(false);
        engine.set_module_resolver(resolver);

        let stdout = self.stdout.clone();
        engine.on_print(move |text| {
            if let Err(e) = stdout.write_line(Role::Stdout, text) {
                tracing::warn!(error = %e, "Failed to write script output");
            }
        });

        let stderr = self.stderr.clone();
        engine.on_debug(move |text, _source, position| {
            let line = if position.is_none() {
                text.to_string()
            } else {
                format!("{position:?} | {text}")
            };
            if let Err(e) = stderr.write_line(Role::Stderr, &line) {
                tracing::warn!(error = %e, "Failed to write script debug output");
            }
        });

        engine.register_type_with_name::<Deferred>("Deferred");
        engine.register_fn("defer", Deferred::new);
        engine.register_fn("sleep", |ms: INT| std::thread::sleep(millis(ms)));

        let base = dir.to_path_buf();
        engine.register_fn("resolve", move |path: &str| -> String {
            resolve_relative(&base, path).to_string_lossy().into_owned()
        });

        engine
    }

    fn build_scope(&self, dir: &Path) -> Scope<'static> {
        let env: Map = std::env::vars()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let mut platform = Map::new();
        platform.insert("os".into(), CURRENT_PLATFORM.os.into());
        platform.insert("arch".into(), CURRENT_PLATFORM.arch.into());

        let mut scope = Scope::new();
        scope.push_dynamic("host", self.host.handle());
        scope.push_dynamic("options", self.options.handle());
        scope.push_constant("env", env);
        scope.push_constant("platform", platform);
        scope.push_constant("event", self.event.to_string());
        scope.push_constant("script_path", self.path.to_string_lossy().into_owned());
        scope.push_constant("script_dir", dir.to_string_lossy().into_owned());
        scope
    }

    /// Wait for deferred results until a plain value comes back
    fn settle(
        &self,
        engine: &Engine,
        ast: &AST,
        mut value: Dynamic,
        started: Instant,
    ) -> Result<Dynamic> {
        while let Some(deferred) = value.clone().try_cast::<Deferred>() {
            if let Some(limit) = self.timeout
                && started.elapsed() + deferred.delay > limit
            {
                return Err(Error::script(
                    self.path,
                    std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("deferred result did not settle within {}s", limit.as_secs()),
                    ),
                ));
            }

            tracing::debug!(delay_ms = deferred.delay.as_millis(), "Waiting for deferred result");
            std::thread::sleep(deferred.delay);

            value = deferred
                .callback
                .call::<Dynamic>(engine, ast, ())
                .map_err(|e| Error::script(self.path, *e))?;
        }

        Ok(value)
    }
}

/// Resolve `path` against `base` unless it is already absolute
///
/// Existing paths are canonicalized so symlinks resolve the same way as
/// `script_dir`.
fn resolve_relative(base: &Path, path: &str) -> PathBuf {
    let joined = base.join(path);
    fs::canonicalize(&joined).unwrap_or(joined)
}

fn millis(ms: INT) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        host: SharedValue,
        options: SharedValue,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                host: SharedValue::from_json(&json!({ "service": {} })).unwrap(),
                options: SharedValue::from_json(&json!({ "stage": "dev" })).unwrap(),
            }
        }

        fn write(&self, name: &str, source: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, source).unwrap();
            path
        }

        fn run(&self, path: &Path) -> Result<Dynamic> {
            self.run_with(path, &Stream::Null, None)
        }

        fn run_with(
            &self,
            path: &Path,
            stdout: &Stream,
            timeout: Option<Duration>,
        ) -> Result<Dynamic> {
            ScriptContext {
                path,
                event: "test",
                host: &self.host,
                options: &self.options,
                stdout,
                stderr: &Stream::Null,
                timeout,
            }
            .run()
        }
    }

    #[test]
    fn test_mutates_host_state() {
        let fx = Fixture::new();
        let script = fx.write("hook.rhai", r#"host.service.artifact = "test.zip";"#);

        fx.run(&script).unwrap();
        assert_eq!(
            fx.host.pointer("/service/artifact").unwrap(),
            Some(json!("test.zip"))
        );
    }

    #[test]
    fn test_returns_result_value() {
        let fx = Fixture::new();
        let script = fx.write("value.rhai", "40 + 2");

        let value = fx.run(&script).unwrap();
        assert_eq!(value.as_int().unwrap(), 42);
    }

    #[test]
    fn test_injected_globals() {
        let fx = Fixture::new();
        let script = fx.write(
            "globals.rhai",
            r#"
            host.service.stage = options.stage;
            host.service.event = event;
            host.service.os = platform.os;
            host.service.dir = script_dir;
            host.service.path = script_path;
            host.service.has_env = env.len() > 0;
            "#,
        );

        fx.run(&script).unwrap();
        let service = fx.host.pointer("/service").unwrap().unwrap();
        let canonical_dir = fs::canonicalize(fx.dir.path()).unwrap();

        assert_eq!(service["stage"], json!("dev"));
        assert_eq!(service["event"], json!("test"));
        assert_eq!(service["os"], json!(CURRENT_PLATFORM.os));
        assert_eq!(service["dir"], json!(canonical_dir.to_string_lossy()));
        assert_eq!(service["path"], json!(script.to_string_lossy()));
        assert_eq!(service["has_env"], json!(true));
    }

    #[test]
    fn test_writes_to_options_are_shared() {
        let fx = Fixture::new();
        let script = fx.write("opts.rhai", r#"options.region = "eu-west-1";"#);

        fx.run(&script).unwrap();
        assert_eq!(fx.options.pointer("/region").unwrap(), Some(json!("eu-west-1")));
    }

    #[test]
    fn test_waits_for_deferred_result() {
        let fx = Fixture::new();
        let script = fx.write(
            "deferred.rhai",
            r#"defer(100, || { host.service.artifact = "test.zip"; })"#,
        );

        let started = Instant::now();
        fx.run(&script).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(
            fx.host.pointer("/service/artifact").unwrap(),
            Some(json!("test.zip"))
        );
    }

    #[test]
    fn test_chained_deferred_results() {
        let fx = Fixture::new();
        let script = fx.write(
            "chain.rhai",
            r#"
            host.service.steps = [];
            defer(10, || {
                host.service.steps.push("first");
                defer(10, || { host.service.steps.push("second"); 7 })
            })
            "#,
        );

        let value = fx.run(&script).unwrap();
        assert_eq!(value.as_int().unwrap(), 7);
        assert_eq!(
            fx.host.pointer("/service/steps").unwrap(),
            Some(json!(["first", "second"]))
        );
    }

    #[test]
    fn test_deferred_timeout() {
        let fx = Fixture::new();
        let script = fx.write("slow.rhai", "defer(5000, || 1)");

        let started = Instant::now();
        let err = fx
            .run_with(&script, &Stream::Null, Some(Duration::from_secs(1)))
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, Error::ScriptEvaluation { .. }));
    }

    #[test]
    fn test_imports_resolve_against_script_dir() {
        let fx = Fixture::new();
        fx.write("helper.rhai", r#"fn greet() { "hello" }"#);
        let script = fx.write(
            "main.rhai",
            r#"
            import "helper" as helper;
            host.service.artifact = helper::greet() + resolve("helper.rhai");
            "#,
        );

        fx.run(&script).unwrap();
        let helper = fs::canonicalize(fx.dir.path().join("helper.rhai")).unwrap();
        assert_eq!(
            fx.host.pointer("/service/artifact").unwrap(),
            Some(json!(format!("hello{}", helper.display())))
        );
    }

    #[test]
    fn test_print_goes_to_stdout_stream() {
        let fx = Fixture::new();
        let out = fx.dir.path().join("stdout.log");
        let script = fx.write("print.rhai", r#"print("from script");"#);

        fx.run_with(&script, &Stream::append_to(&out).unwrap(), None)
            .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "from script\n");
    }

    #[test]
    fn test_runtime_error_keeps_engine_error() {
        let fx = Fixture::new();
        let script = fx.write("boom.rhai", r#"throw "boom";"#);

        let err = fx.run(&script).unwrap_err();
        match err {
            Error::ScriptEvaluation { path, source } => {
                assert_eq!(path, script);
                let engine_error = source.downcast_ref::<rhai::EvalAltResult>().unwrap();
                assert!(matches!(engine_error, rhai::EvalAltResult::ErrorRuntime(..)));
                assert!(engine_error.to_string().contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error() {
        let fx = Fixture::new();
        let script = fx.write("broken.rhai", "let = ;");

        let err = fx.run(&script).unwrap_err();
        assert!(matches!(err, Error::ScriptEvaluation { .. }));
    }

    #[test]
    fn test_fresh_context_per_run() {
        let fx = Fixture::new();
        let first = fx.write("first.rhai", "let leaked = 1;");
        let second = fx.write("second.rhai", "leaked");

        fx.run(&first).unwrap();
        assert!(fx.run(&second).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_script_dir_follows_symlink() {
        let fx = Fixture::new();
        let real_dir = fx.dir.path().join("real");
        fs::create_dir(&real_dir).unwrap();
        fs::write(real_dir.join("helper.rhai"), r#"fn name() { "real" }"#).unwrap();
        fs::write(
            real_dir.join("hook.rhai"),
            r#"host.service.dir = script_dir; host.service.helper = resolve("helper.rhai");"#,
        )
        .unwrap();

        let link = fx.dir.path().join("link.rhai");
        std::os::unix::fs::symlink(real_dir.join("hook.rhai"), &link).unwrap();

        fx.run(&link).unwrap();
        let canonical_dir = fs::canonicalize(&real_dir).unwrap();
        assert_eq!(
            fx.host.pointer("/service/dir").unwrap(),
            Some(json!(canonical_dir.to_string_lossy()))
        );
        assert_eq!(
            fx.host.pointer("/service/helper").unwrap(),
            Some(json!(canonical_dir.join("helper.rhai").to_string_lossy()))
        );
    }
}
