use crate::{
    FunctionCallAnalyzer, ImportAnalyzer, Result, ViewAnalysisError, ViewCall, ViewImportType,
    ViewIntelligence, ViewTarget,
};
use std::collections::BTreeMap;
use tempest_php_parser::PhpParser;
use tree_sitter::Tree;

fn parse_php_code(code: &str) -> Result<Tree> {
    let parser = PhpParser::new().map_err(|e| ViewAnalysisError::ParseError(e.to_string()))?;
    parser
        .parse(code, None)
        .map_err(|e| ViewAnalysisError::ParseError(e.to_string()))
}

fn analyze_imports(code: &str) -> BTreeMap<String, ViewImportType> {
    let tree = parse_php_code(code).unwrap();
    ImportAnalyzer::analyze_imports(&tree, code, &ViewTarget::default()).unwrap()
}

fn analyze_calls(code: &str) -> Vec<ViewCall> {
    let tree = parse_php_code(code).unwrap();
    FunctionCallAnalyzer::find_function_calls(&tree, code).unwrap()
}

fn view_calls(code: &str) -> Vec<ViewCall> {
    let tree = parse_php_code(code).unwrap();
    ViewIntelligence::find_view_calls(&tree, code, &ViewTarget::default()).unwrap()
}

#[test]
fn test_direct_namespace_calls_work() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;

final readonly class HomeController
{
    public function __invoke(): View
    {
        return Tempest\view(__DIR__ . '/../Views/home.view.php');
    }

    public function other(): View
    {
        return \Tempest\view(__DIR__ . '/../Views/other.view.php');
    }
}"#;

    let imports = analyze_imports(code);
    let calls = analyze_calls(code);

    assert_eq!(imports.get("Tempest\\view"), Some(&ViewImportType::DirectNamespace));
    assert_eq!(imports.get("\\Tempest\\view"), Some(&ViewImportType::DirectNamespace));

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].function_name, "Tempest\\view");
    assert_eq!(calls[1].function_name, "\\Tempest\\view");
    assert_eq!(calls[0].parameters.len(), 1);
    assert_eq!(calls[1].parameters.len(), 1);
    assert_eq!(calls[0].line, 10);
    assert_eq!(calls[1].line, 15);
}

#[test]
fn test_simple_function_import() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;
use function Tempest\view;

final readonly class HomeController
{
    public function __invoke(): View
    {
        return view(__DIR__ . '/../Views/home.view.php');
    }
}"#;

    let imports = analyze_imports(code);
    let calls = view_calls(code);

    assert_eq!(imports.get("view"), Some(&ViewImportType::FunctionImport));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "view");
    assert_eq!(calls[0].line, 11);
    assert_eq!(calls[0].column, 15);
}

#[test]
fn test_class_import_is_not_a_function_import() {
    let code = r#"<?php
use Tempest\view;

view('home.view.php');
"#;

    let imports = analyze_imports(code);
    assert!(!imports.contains_key("view"));
    assert!(view_calls(code).is_empty());
}

#[test]
fn test_grouped_function_import() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;
use function Tempest\{root_path, view};

final readonly class HomeController
{
    public function __invoke(): View
    {
        return view(__DIR__ . '/../Views/home.view.php');
    }
}"#;

    let imports = analyze_imports(code);
    let calls = view_calls(code);

    assert_eq!(imports.get("view"), Some(&ViewImportType::FunctionImport));
    assert!(!imports.contains_key("root_path"));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "view");
}

#[test]
fn test_grouped_import_with_alias() {
    let code = r#"<?php
use function Tempest\{root_path, view as render};

render('home.view.php');
"#;

    let imports = analyze_imports(code);
    assert_eq!(
        imports.get("render"),
        Some(&ViewImportType::FunctionImportWithAlias("render".to_string()))
    );
    assert!(!imports.contains_key("view"));
    assert_eq!(view_calls(code).len(), 1);
}

#[test]
fn test_mixed_group_function_import() {
    let code = r#"<?php
use Tempest\{function view};

view('home.view.php');
"#;

    let imports = analyze_imports(code);
    assert_eq!(imports.get("view"), Some(&ViewImportType::FunctionImport));

    let calls = view_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].line, 4);
}

#[test]
fn test_mixed_group_with_class_and_alias() {
    let code = r#"<?php
use Tempest\{Router, function view as render};

render('home.view.php');
"#;

    let imports = analyze_imports(code);
    assert_eq!(
        imports.get("render"),
        Some(&ViewImportType::FunctionImportWithAlias("render".to_string()))
    );
    assert!(!imports.contains_key("Router"));
    assert_eq!(view_calls(code).len(), 1);
}

#[test]
fn test_class_group_import_is_not_a_function_import() {
    let code = r#"<?php
use Tempest\{view};

view('home.view.php');
"#;

    assert!(!analyze_imports(code).contains_key("view"));
    assert!(view_calls(code).is_empty());
}

#[test]
fn test_aliased_function_import() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;
use function Tempest\view as SomeMethod;

final readonly class HomeController
{
    public function __invoke(): View
    {
        return SomeMethod(__DIR__ . '/../Views/home.view.php');
    }
}"#;

    let imports = analyze_imports(code);
    let calls = view_calls(code);

    assert_eq!(
        imports.get("SomeMethod"),
        Some(&ViewImportType::FunctionImportWithAlias("SomeMethod".to_string()))
    );
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "SomeMethod");
}

#[test]
fn test_comma_separated_function_imports() {
    let code = r#"<?php
use function Tempest\map, Tempest\view;

view('home.view.php');
map([]);
"#;

    let imports = analyze_imports(code);
    assert_eq!(imports.get("view"), Some(&ViewImportType::FunctionImport));

    let calls = view_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "view");
}

#[test]
fn test_leading_backslash_in_use_clause() {
    let code = r#"<?php
use function \Tempest\view;

view('home.view.php');
"#;

    assert_eq!(analyze_imports(code).get("view"), Some(&ViewImportType::FunctionImport));
}

#[test]
fn test_view_from_other_namespace_is_ignored() {
    let code = r#"<?php
use function Illuminate\view;
use const Tempest\view;

view('welcome');
"#;

    let imports = analyze_imports(code);
    assert!(!imports.contains_key("view"));
    assert!(view_calls(code).is_empty());
}

#[test]
fn test_grouped_import_without_view() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;
use function Tempest\{root_path, helper};

final readonly class HomeController
{
    public function __invoke(): View
    {
        return view(__DIR__ . '/../Views/home.view.php');
    }
}"#;

    let calls = analyze_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function_name, "view");

    assert!(view_calls(code).is_empty());
}

#[test]
fn test_mixed_imports_and_calls() {
    let code = r#"<?php
namespace App\Controllers;

use Tempest\View\View;
use function Tempest\view;
use function Tempest\view as render;

final readonly class HomeController
{
    public function one(): View
    {
        return view(__DIR__ . '/../Views/one.view.php');
    }

    public function two(): View
    {
        return render(__DIR__ . '/../Views/two.view.php');
    }

    public function three(): View
    {
        return Tempest\view(__DIR__ . '/../Views/three.view.php');
    }

    public function four(): View
    {
        return \Tempest\view(__DIR__ . '/../Views/four.view.php');
    }

    public function five(): string
    {
        return strtoupper('not a view');
    }
}"#;

    let imports = analyze_imports(code);
    assert_eq!(imports.len(), 4);
    assert!(imports.contains_key("view"));
    assert!(imports.contains_key("render"));
    assert!(imports.contains_key("Tempest\\view"));
    assert!(imports.contains_key("\\Tempest\\view"));

    let calls = view_calls(code);
    let call_names: Vec<&str> = calls.iter().map(|c| c.function_name.as_str()).collect();
    assert_eq!(
        call_names,
        vec!["view", "render", "Tempest\\view", "\\Tempest\\view"]
    );
}

#[test]
fn test_method_and_static_calls_are_not_function_calls() {
    let code = r#"<?php
use function Tempest\view;

$this->view('a.view.php');
View::view('b.view.php');
"#;

    assert!(analyze_calls(code).is_empty());
}

#[test]
fn test_nested_view_call_is_found() {
    let code = r#"<?php
use function Tempest\view;

return response(view('nested.view.php'));
"#;

    let calls = view_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "view('nested.view.php')");
}

#[test]
fn test_parameter_parsing() {
    let code = r#"<?php
namespace App\Controllers;

use function Tempest\view;

final readonly class HomeController
{
    public function simple(): View
    {
        return view('template.view.php');
    }

    public function withData(): View
    {
        return view('template.view.php', ['key' => 'value']);
    }

    public function complex(): View
    {
        return view(
            __DIR__ . '/../Views/home.view.php',
            $this->getData(),
            $options
        );
    }

    public function bare(): View
    {
        return view();
    }
}"#;

    let calls = view_calls(code);
    assert_eq!(calls.len(), 4);

    assert_eq!(calls[0].parameters.len(), 1);
    assert_eq!(calls[0].parameters[0].value, "'template.view.php'");
    assert!(calls[0].parameters[0].name.is_none());

    assert_eq!(calls[1].parameters.len(), 2);
    assert_eq!(calls[1].parameters[0].value, "'template.view.php'");
    assert_eq!(calls[1].parameters[1].value, "['key' => 'value']");

    assert_eq!(calls[2].parameters.len(), 3);
    assert_eq!(
        calls[2].parameters[0].value,
        "__DIR__ . '/../Views/home.view.php'"
    );
    assert_eq!(calls[2].parameters[1].value, "$this->getData()");
    assert_eq!(calls[2].parameters[2].value, "$options");
    assert_eq!(calls[2].line, 20);

    assert!(calls[3].parameters.is_empty());
}

#[test]
fn test_named_parameter_parsing() {
    let code = r#"<?php
namespace Happytodev\Cyclone\Controllers;

use Tempest\View\View;
use function Tempest\{root_path, view};

final readonly class HomeController
{
    public function __invoke(): View
    {
        return view(path: __DIR__ . '/../Views/home.view.php', title: 'Home');
    }
}"#;

    let calls = view_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].parameters.len(), 2);

    let path = &calls[0].parameters[0];
    assert_eq!(path.name, Some("path".to_string()));
    assert_eq!(path.value, "__DIR__ . '/../Views/home.view.php'");
    assert_eq!(path.raw_text, "path: __DIR__ . '/../Views/home.view.php'");

    let title = &calls[0].parameters[1];
    assert_eq!(title.name, Some("title".to_string()));
    assert_eq!(title.value, "'Home'");
}

#[test]
fn test_view_call_inside_template_with_inline_html() {
    let code = r#"<html>
<?php echo \Tempest\view('partial.view.php'); ?>
</html>
"#;

    let calls = view_calls(code);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].line, 2);
}

#[test]
fn test_custom_view_target() {
    let code = r#"<?php
use function App\Support\render_page;

render_page('dashboard');
App\Support\render_page('settings');
"#;

    let tree = parse_php_code(code).unwrap();
    let target = ViewTarget::new("App\\Support", "render_page");
    let result = ViewIntelligence::analyze(&tree, code, &target).unwrap();

    assert_eq!(
        result.imports.get("render_page"),
        Some(&ViewImportType::FunctionImport)
    );
    assert_eq!(result.call_count(), 2);
    assert!(result.has_view_usage());
}

#[test]
fn test_file_without_view_usage() {
    let code = "<?php\necho strlen('abc');\n";
    let tree = parse_php_code(code).unwrap();
    let result = ViewIntelligence::analyze(&tree, code, &ViewTarget::default()).unwrap();

    assert_eq!(result.imports.len(), 2);
    assert_eq!(result.call_count(), 0);
    assert!(!result.has_view_usage());
}

#[test]
fn test_analysis_result_serializes_for_clients() {
    let code = "<?php\nuse function Tempest\\view as render;\nrender(path: 'a.view.php');\n";
    let tree = parse_php_code(code).unwrap();
    let result = ViewIntelligence::analyze(&tree, code, &ViewTarget::default()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["imports"]["render"]["kind"], "function_import_with_alias");
    assert_eq!(json["imports"]["render"]["alias"], "render");
    assert_eq!(json["calls"][0]["functionName"], "render");
    assert_eq!(json["calls"][0]["parameters"][0]["rawText"], "path: 'a.view.php'");
}
