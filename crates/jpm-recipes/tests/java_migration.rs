//! Java API migrations on parsed sources

use jpm_composition::{Composer, Recipe};
use jpm_recipes::{MethodRename, MigrateApi, MigrateApiOptions, RecipeConfig};
use jpm_test_utils::{assert_rewrite, assert_unchanged, init_tracing, parse_java, parse_pom};
use std::path::Path;
use std::sync::Arc;

const HTMLUNIT_2: &str = r#"
    package org.example;

    import com.gargoylesoftware.htmlunit.WebClient;
    import com.gargoylesoftware.htmlunit.html.HtmlForm;
    import com.gargoylesoftware.htmlunit.html.HtmlInput;
    import com.gargoylesoftware.htmlunit.html.HtmlPage;

    import java.io.IOException;

    public class HtmlUnitUse {
        void run() throws IOException {
            try (WebClient webClient = new WebClient()) {
                HtmlPage page = webClient.getPage("https://htmlunit.sourceforge.io/");
                HtmlForm form = page.getFormByName("config");
                HtmlInput a = form.getInputByName("a");
                String value = a.getValueAttribute();
                assert "".equals(value);
                a.setAttribute("value", "up2");
                a.setAttribute("value2", "leave");
                a.setValueAttribute("updated");
            }
        }
    }
    "#;

const HTMLUNIT_3: &str = r#"
    package org.example;

    import org.htmlunit.WebClient;
    import org.htmlunit.html.HtmlForm;
    import org.htmlunit.html.HtmlInput;
    import org.htmlunit.html.HtmlPage;

    import java.io.IOException;

    public class HtmlUnitUse {
        void run() throws IOException {
            try (WebClient webClient = new WebClient()) {
                HtmlPage page = webClient.getPage("https://htmlunit.sourceforge.io/");
                HtmlForm form = page.getFormByName("config");
                HtmlInput a = form.getInputByName("a");
                String value = a.getValue();
                assert "".equals(value);
                a.setAttribute("value", "up2");
                a.setAttribute("value2", "leave");
                a.setValue("updated");
            }
        }
    }
    "#;

const SOURCE_PATH: &str = "src/test/java/org/example/HtmlUnitUse.java";

#[test]
fn htmlunit_2_moves_to_3() {
    init_tracing();
    assert_rewrite(&MigrateApi::htmlunit_3(), &parse_java(SOURCE_PATH, HTMLUNIT_2), HTMLUNIT_3);
}

#[test]
fn renamed_package_with_old_accessors_converges() {
    let intermediate = HTMLUNIT_3
        .replace("a.getValue()", "a.getValueAttribute()")
        .replace("a.setValue(", "a.setValueAttribute(");
    assert_rewrite(&MigrateApi::htmlunit_3(), &parse_java(SOURCE_PATH, &intermediate), HTMLUNIT_3);
}

#[test]
fn wildcard_import_moves_with_its_accessors() {
    let before = parse_java(
        "src/test/java/F.java",
        r#"
        import com.gargoylesoftware.htmlunit.html.*;

        class F {
            void fill(HtmlInput a) {
                a.setValueAttribute("updated");
            }
        }
        "#,
    );
    assert_rewrite(
        &MigrateApi::htmlunit_3(),
        &before,
        r#"
        import org.htmlunit.html.*;

        class F {
            void fill(HtmlInput a) {
                a.setValue("updated");
            }
        }
        "#,
    );
}

#[test]
fn accessor_on_unrelated_type_is_untouched() {
    let source = parse_java(
        "src/main/java/B.java",
        r#"
        import com.example.Form;

        class B {
            String read(Form input) {
                return input.getValueAttribute();
            }
        }
        "#,
    );
    assert_unchanged(&MigrateApi::htmlunit_3(), &source);
}

#[test]
fn rewritten_imports_move_to_the_front() {
    let before = parse_java(
        "src/main/java/C.java",
        r"
        import java.io.IOException;
        import com.gargoylesoftware.htmlunit.WebClient;

        class C {
            WebClient client;

            void close() throws IOException {}
        }
        ",
    );
    assert_rewrite(
        &MigrateApi::htmlunit_3(),
        &before,
        r"
        import org.htmlunit.WebClient;

        import java.io.IOException;

        class C {
            WebClient client;

            void close() throws IOException {}
        }
        ",
    );
}

#[test]
fn qualified_annotation_is_rewritten_in_place() {
    let before = parse_java(
        "src/main/java/D.java",
        r"
        class D {
            @javax.annotation.Nonnull
            String name() {
                return null;
            }
        }
        ",
    );
    assert_rewrite(
        &MigrateApi::javax_annotations_to_spotbugs(),
        &before,
        r"
        class D {
            @edu.umd.cs.findbugs.annotations.NonNull
            String name() {
                return null;
            }
        }
        ",
    );
}

#[test]
fn configured_migration_renames_methods() {
    let options = MigrateApiOptions {
        target_package: "org.example.next".into(),
        legacy_packages: vec!["org.example.legacy".into()],
        type_renames: Vec::new(),
        method_renames: vec![MethodRename {
            declaring_type: "org.example.next.Client".into(),
            from: "fetchAll".into(),
            to: "list".into(),
        }],
        sort_imports: false,
    };
    let recipe = RecipeConfig::MigrateApi(options).instantiate().unwrap();
    let before = parse_java(
        "src/main/java/E.java",
        r"
        import org.example.legacy.Client;

        class E {
            void run(Client client) {
                client.fetchAll();
            }
        }
        ",
    );
    assert_rewrite(
        recipe.as_ref(),
        &before,
        r"
        import org.example.next.Client;

        class E {
            void run(Client client) {
                client.list();
            }
        }
        ",
    );
}

#[test]
fn composer_applies_java_recipes_only_to_java() {
    let recipes: Vec<Arc<dyn Recipe>> = vec![
        Arc::new(MigrateApi::htmlunit_3()),
        Arc::new(MigrateApi::javax_annotations_to_spotbugs()),
    ];
    let pom = parse_pom(
        r"
        <project>
            <artifactId>example</artifactId>
        </project>
        ",
    );
    let java = parse_java(SOURCE_PATH, HTMLUNIT_2);
    let report = Composer::new(recipes).unwrap().run(&[pom, java]);

    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    assert_eq!(report.changed, vec![Path::new(SOURCE_PATH).to_path_buf()]);
    let migrated = report.source(Path::new(SOURCE_PATH)).unwrap().document().print();
    assert!(migrated.contains("import org.htmlunit.html.HtmlInput;"));
    assert!(migrated.contains("a.setValue(\"updated\");"));
}

#[test]
fn past_time_string_on_qualified_util() {
    let before = parse_java(
        "src/main/java/org/example/MyConsumer.java",
        r"
        package org.example;

        class MyConsumer {
            String format(long timestamp) {
                return hudson.Util.getPastTimeString(timestamp);
            }
        }
        ",
    );
    assert_rewrite(
        &MigrateApi::hudson_util_time_span(),
        &before,
        r"
        package org.example;

        class MyConsumer {
            String format(long timestamp) {
                return hudson.Util.getTimeSpanString(timestamp);
            }
        }
        ",
    );
}

#[test]
fn past_time_string_on_imported_util() {
    let before = parse_java(
        "src/main/java/org/example/MyConsumer.java",
        r"
        package org.example;

        import hudson.Util;

        class MyConsumer {
            String format(long timestamp) {
                return Util.getPastTimeString(timestamp);
            }
        }
        ",
    );
    assert_rewrite(
        &MigrateApi::hudson_util_time_span(),
        &before,
        r"
        package org.example;

        import hudson.Util;

        class MyConsumer {
            String format(long timestamp) {
                return Util.getTimeSpanString(timestamp);
            }
        }
        ",
    );
}

#[test]
fn past_time_string_through_static_import() {
    let before = parse_java(
        "src/main/java/org/example/MyConsumer.java",
        r"
        package org.example;

        import static hudson.Util.getPastTimeString;

        class MyConsumer {
            String format(long timestamp) {
                return getPastTimeString(timestamp);
            }
        }
        ",
    );
    assert_rewrite(
        &MigrateApi::hudson_util_time_span(),
        &before,
        r"
        package org.example;

        import static hudson.Util.getTimeSpanString;

        class MyConsumer {
            String format(long timestamp) {
                return getTimeSpanString(timestamp);
            }
        }
        ",
    );
}

#[test]
fn past_time_string_elsewhere_is_untouched() {
    let source = parse_java(
        "src/main/java/org/example/Other.java",
        r"
        package org.example;

        class Other {
            String getPastTimeString(long t) {
                return null;
            }

            String format(long timestamp) {
                return getPastTimeString(timestamp);
            }
        }
        ",
    );
    assert_unchanged(&MigrateApi::hudson_util_time_span(), &source);
}
