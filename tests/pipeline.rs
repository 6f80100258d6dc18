//! Multi-file driver tests: discovery, module naming and per-file isolation.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;
use tuglint::{analyze_files, AnalysisOptions};
use tuglint_core::{OutputErrorCode, TuglintError};
use tuglint_python::SubscriptionRegistry;
use tuglint_python_cst::Kind;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/__init__.py", "");
    write(
        dir.path(),
        "app/models.py",
        "class Base:\n    pass\nclass User(Base):\n    pass\n",
    );
    write(dir.path(), "app/broken.py", "def oops(:\n    pass\n");
    write(dir.path(), "app/views.py", "def index():\n    pass\n");
    dir
}

/// Reports every class with its fully qualified name.
fn class_registry<'r>() -> SubscriptionRegistry<'r> {
    let mut registry = SubscriptionRegistry::new();
    registry.register_node(&[Kind::ClassDef], |ctx| {
        let Some(node) = ctx.syntax_node() else {
            return;
        };
        let Some(class) = ctx.class_symbol(node) else {
            return;
        };
        let name = class.fully_qualified_name().unwrap_or_default().to_string();
        ctx.add_issue(node, name);
    });
    registry
}

#[test]
fn test_failed_file_does_not_stop_the_run() {
    let dir = workspace();
    let outcomes = analyze_files(&[dir.path()], &AnalysisOptions::default(), |_| class_registry());

    let modules: Vec<&str> = outcomes.iter().map(|o| o.module_name.as_str()).collect();
    assert_eq!(modules, vec!["app", "app.broken", "app.models", "app.views"]);

    let broken = &outcomes[1];
    assert!(!broken.is_ok());
    assert!(broken.issues().is_empty());
    let err = broken.result.as_ref().unwrap_err();
    assert_eq!(err.error_code(), OutputErrorCode::SyntaxError);

    let models = &outcomes[2];
    let messages: Vec<&str> = models.issues().iter().map(|i| i.message.as_str()).collect();
    assert_eq!(messages, vec!["app.models.Base", "app.models.User"]);
    assert!(outcomes[3].is_ok());
}

#[test]
fn test_each_file_gets_a_fresh_registry() {
    let dir = workspace();
    let seen: Rc<RefCell<Vec<(String, usize)>>> = Rc::new(RefCell::new(Vec::new()));

    let outcomes = analyze_files(&[dir.path().join("app")], &AnalysisOptions::default(), |path| {
        let file = path.file_name().unwrap().to_string_lossy().into_owned();
        let seen = Rc::clone(&seen);
        let mut count = 0;
        let mut registry = SubscriptionRegistry::new();
        registry.register_node(&[Kind::PassStmt], move |_| {
            count += 1;
            seen.borrow_mut().push((file.clone(), count));
        });
        registry
    });

    assert_eq!(outcomes.len(), 4);
    let seen = seen.borrow();
    // Counts restart at 1 in every file.
    assert_eq!(
        *seen,
        vec![
            ("models.py".to_string(), 1),
            ("models.py".to_string(), 2),
            ("views.py".to_string(), 1),
        ]
    );
}

#[test]
fn test_single_file_and_missing_path() {
    let dir = workspace();
    let file = dir.path().join("app/views.py");
    let missing = dir.path().join("nowhere");
    let outcomes = analyze_files(&[file, missing], &AnalysisOptions::default(), |_| class_registry());

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].module_name, "views");
    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(TuglintError::FileNotFound { .. })
    ));
}
