//! Rendering of the generated Cargo script.
//!
//! The script carries its own manifest in a frontmatter block, imports the
//! scanned package under [`PACKAGE_ALIAS`], registers every discovered struct
//! with the conversion facility and asks it to write the output file.

use crate::config::FacilityConfig;
use crate::manifest::CrateDependency;
use crate::params::BuildParameters;
use crate::scanner::ScanResult;
use std::path::Path;

/// Alias the scanned package is imported under.
pub const PACKAGE_ALIAS: &str = "m";

/// Token printed by the generated program once the output file is written.
pub const SUCCESS_TOKEN: &str = "OK";

/// Edition declared in the generated manifest.
const SCRIPT_EDITION: &str = "2024";

/// Everything the generated program is rendered from.
#[derive(Debug, Clone)]
pub struct ProgramTemplate<'a> {
    params: &'a BuildParameters,
    package: &'a CrateDependency,
    facility: &'a FacilityConfig,
    target_file: &'a Path,
    structs: Vec<String>,
}

impl<'a> ProgramTemplate<'a> {
    /// `target_file` is written verbatim into the program, which runs inside
    /// the workspace; callers pass an absolute path.
    pub fn new(
        params: &'a BuildParameters,
        package: &'a CrateDependency,
        facility: &'a FacilityConfig,
        scan: &ScanResult,
        target_file: &'a Path,
    ) -> Self {
        Self {
            params,
            package,
            facility,
            target_file,
            structs: qualified_structs(scan),
        }
    }

    /// Struct paths the program registers, in scan order.
    pub fn structs(&self) -> &[String] {
        &self.structs
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        // Embedded manifest
        output.push_str("---\n");
        output.push_str("[package]\n");
        output.push_str(&format!("edition = \"{}\"\n\n", SCRIPT_EDITION));
        output.push_str("[dependencies]\n");
        output.push_str(&self.package.render());
        output.push('\n');
        output.push_str(&format!(
            "{} = {}\n",
            self.facility.crate_name, self.facility.dependency
        ));
        output.push_str("---\n\n");

        output.push_str(&format!(
            "use {} as {};\n",
            self.params.package_path.trim(),
            PACKAGE_ALIAS
        ));
        output.push_str(&format!("use {};\n\n", self.facility.type_path));

        output.push_str("fn main() {\n");
        output.push_str(&format!(
            "    let mut t = {}::new();\n",
            self.facility.type_name()
        ));
        output.push_str(&format!(
            "    t.create_interface = {};\n",
            self.params.create_interface
        ));
        for (name, value) in &self.params.init_params {
            output.push_str(&format!("    t.{} = {};\n", name, value));
        }
        output.push('\n');

        for name in &self.structs {
            output.push_str(&format!("    t.add::<{}>();\n", name));
        }
        output.push('\n');

        for import in &self.params.custom_imports {
            output.push_str(&format!("    t.add_import({:?});\n", import));
        }
        output.push('\n');

        output.push_str(&format!(
            "    if let Err(err) = t.convert_to_file({:?}) {{\n",
            self.target_file.to_string_lossy()
        ));
        output.push_str("        panic!(\"{}\", err);\n");
        output.push_str("    }\n");
        output.push_str(&format!("    println!(\"{}\");\n", SUCCESS_TOKEN));
        output.push_str("}\n");

        output
    }
}

/// Prefixes every discovered name with the package alias, dropping names
/// that are blank after trimming.
pub fn qualified_structs(scan: &ScanResult) -> Vec<String> {
    scan.iter()
        .map(|declaration| declaration.name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| format!("{}::{}", PACKAGE_ALIAS, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DeclarationScanner;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn package() -> CrateDependency {
        CrateDependency {
            alias: "shop_models".to_string(),
            package_name: "shop-models".to_string(),
            manifest_dir: PathBuf::from("/work/shop"),
        }
    }

    fn scan_of(source: &str) -> ScanResult {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("models.rs"), source).unwrap();
        DeclarationScanner::new(temp_dir.path()).scan().unwrap()
    }

    #[test]
    fn test_render_full_program() {
        let params = BuildParameters::builder("shop_models::domain", "/out/models.ts")
            .custom_import("import { Decimal } from 'decimal.js';")
            .init_param("indent", "String::from(\"  \")")
            .build();
        let package = package();
        let facility = FacilityConfig::default();
        let scan = scan_of("pub struct Order { id: u64 }\npub struct Customer;\n");
        let target = PathBuf::from("/out/models.ts");

        let rendered = ProgramTemplate::new(&params, &package, &facility, &scan, &target).render();

        let expected = r#"---
[package]
edition = "2024"

[dependencies]
shop_models = { package = "shop-models", path = "/work/shop" }
typescriptify = "0.1"
---

use shop_models::domain as m;
use typescriptify::TypeScriptify;

fn main() {
    let mut t = TypeScriptify::new();
    t.create_interface = true;
    t.backup_dir = String::from(".");
    t.indent = String::from("  ");

    t.add::<m::Order>();
    t.add::<m::Customer>();

    t.add_import("import { Decimal } from 'decimal.js';");

    if let Err(err) = t.convert_to_file("/out/models.ts") {
        panic!("{}", err);
    }
    println!("OK");
}
"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_without_structs() {
        let params = BuildParameters::builder("models", "/out.ts")
            .init_params(BTreeMap::new())
            .create_interface(false)
            .build();
        let package = package();
        let facility = FacilityConfig::default();
        let target = PathBuf::from("/out.ts");

        let template =
            ProgramTemplate::new(&params, &package, &facility, &ScanResult::default(), &target);
        let rendered = template.render();

        assert!(template.structs().is_empty());
        assert!(!rendered.contains("t.add::<"));
        assert!(rendered.contains("t.create_interface = false;"));
        assert!(rendered.contains("t.convert_to_file(\"/out.ts\")"));
    }

    #[test]
    fn test_render_escapes_string_literals() {
        let params = BuildParameters::builder("models", "/out.ts")
            .custom_import(r#"import { "quoted" } from 'x';"#)
            .build();
        let package = package();
        let facility = FacilityConfig::default();
        let target = PathBuf::from(r#"/tmp/we"ird.ts"#);

        let rendered =
            ProgramTemplate::new(&params, &package, &facility, &ScanResult::default(), &target)
                .render();

        assert!(rendered.contains(r#"t.add_import("import { \"quoted\" } from 'x';");"#));
        assert!(rendered.contains(r#"t.convert_to_file("/tmp/we\"ird.ts")"#));
    }

    #[test]
    fn test_render_custom_facility() {
        let params = BuildParameters::new("models", "/out.ts");
        let package = package();
        let facility = FacilityConfig {
            type_path: "ts_bridge::Converter".to_string(),
            crate_name: "ts_bridge".to_string(),
            dependency: toml::Value::String("2.3".to_string()),
        };
        let target = PathBuf::from("/out.ts");

        let rendered =
            ProgramTemplate::new(&params, &package, &facility, &ScanResult::default(), &target)
                .render();

        assert!(rendered.contains("ts_bridge = \"2.3\"\n"));
        assert!(rendered.contains("use ts_bridge::Converter;\n"));
        assert!(rendered.contains("let mut t = Converter::new();"));
    }

    #[test]
    fn test_duplicates_registered_twice() {
        let scan = scan_of("mod a { pub struct Item; }\nmod b { pub struct Item; }\n");
        assert_eq!(qualified_structs(&scan), vec!["m::Item", "m::Item"]);
    }

    #[test]
    fn test_render_is_stable() {
        let params = BuildParameters::new("models", "/out.ts");
        let package = package();
        let facility = FacilityConfig::default();
        let scan = scan_of("struct A; struct B;");
        let target = PathBuf::from("/out.ts");

        let first = ProgramTemplate::new(&params, &package, &facility, &scan, &target).render();
        let second = ProgramTemplate::new(&params, &package, &facility, &scan, &target).render();

        assert_eq!(first, second);
    }
}
