use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;
use tern::{
    ApplyContext, BoxPlugin, CompilerOptions, EntryMap, MemoryFileSystem, Mode, Plugin,
    PluginFactories, Result, create_compiler_with, load_file,
};

/// Checks the `entryOption` arguments against what the config declared.
#[derive(Debug)]
struct MyEntryOptionPlugin {
    context: PathBuf,
    entry: EntryMap,
    calls: Arc<Mutex<usize>>,
}

impl Plugin for MyEntryOptionPlugin {
    fn name(&self) -> &str {
        "MyEntryOptionPlugin"
    }

    fn apply(&self, ctx: &mut ApplyContext<'_>) -> Result<()> {
        let expected_context = self.context.clone();
        let expected_entry = self.entry.clone();
        let calls = self.calls.clone();
        ctx.hooks
            .entry_option
            .tap("MyEntryOptionPlugin", move |context, entry| {
                *calls.lock() += 1;
                if context != expected_context.as_path() {
                    return Err("Context is not equal.".into());
                }
                if !entry.iter().eq(expected_entry.iter()) {
                    return Err("Entry is not strictly equal.".into());
                }
                Ok(())
            });
        Ok(())
    }
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tern.toml");
    fs::write(
        &path,
        r#"
mode = "development"

[entry]
main = "./src/index.js"
test = "./src/index2.js"
"#,
    )
    .unwrap();
    path
}

#[test]
fn entry_option_receives_context_and_entry() {
    let dir = TempDir::new().unwrap();
    let config = load_file(&write_config(&dir)).unwrap();
    assert_eq!(config.mode, Mode::Development);

    let context = config.context.clone().unwrap();
    let entry = config.entry.clone();
    assert_eq!(
        entry.iter().collect::<Vec<_>>(),
        [
            (&"main".to_string(), &"./src/index.js".to_string()),
            (&"test".to_string(), &"./src/index2.js".to_string()),
        ]
    );

    let calls = Arc::new(Mutex::new(0));
    let plugin = MyEntryOptionPlugin {
        context: context.clone(),
        entry,
        calls: calls.clone(),
    };

    let options = CompilerOptions::from_config(config, dir.path()).unwrap();
    assert_eq!(options.context, context);

    let compiler = create_compiler_with(
        options,
        vec![Arc::new(plugin) as BoxPlugin],
        &PluginFactories::with_builtins(),
        Arc::new(MemoryFileSystem::new(dir.path())),
    )
    .unwrap();

    assert_eq!(*calls.lock(), 1);
    assert!(compiler.hooks.entry_option.is_used());
}

#[test]
fn mismatching_tap_aborts_with_its_name() {
    let dir = TempDir::new().unwrap();
    let config = load_file(&write_config(&dir)).unwrap();

    let mut entry = config.entry.clone();
    entry.insert("test".into(), "./src/other.js".into());
    let plugin = MyEntryOptionPlugin {
        context: config.context.clone().unwrap(),
        entry,
        calls: Arc::default(),
    };

    let options = CompilerOptions::from_config(config, dir.path()).unwrap();
    let err = create_compiler_with(
        options,
        vec![Arc::new(plugin) as BoxPlugin],
        &PluginFactories::with_builtins(),
        Arc::new(MemoryFileSystem::new(dir.path())),
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("MyEntryOptionPlugin"), "{message}");
    assert!(message.contains("Entry is not strictly equal."), "{message}");
}
