use super::{FilePart, FileView, Section};
use crate::analysis::CrossReferenceAnalysis;

/// Render composed sections as a plain-text report.
pub fn render_text(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        match section {
            Section::CrossReferences(cross_refs) => render_cross_references(&mut out, cross_refs),
            Section::File(view) => render_file(&mut out, view),
            Section::ErrorHandling { app, api } => render_pair(
                &mut out,
                "Error Handling Analysis",
                ("Application Error Handling", app.as_slice()),
                ("API Error Handling", api.as_slice()),
                "No error handling found",
            ),
            Section::AsyncFunctions { app, api } => render_pair(
                &mut out,
                "Asynchronous Functions",
                ("Application Async Functions", app.as_slice()),
                ("API Async Functions", api.as_slice()),
                "No async functions found",
            ),
        }
        out.push('\n');
    }
    out
}

fn heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&underline.to_string().repeat(title.chars().count()));
    out.push('\n');
}

fn render_list(out: &mut String, title: &str, items: &[String], empty: &str) {
    out.push_str(&format!("  {}:\n", title));
    if items.is_empty() {
        out.push_str(&format!("    ({})\n", empty));
    }
    for item in items {
        out.push_str(&format!("    - {}\n", item));
    }
}

fn render_cross_references(out: &mut String, cross_refs: &CrossReferenceAnalysis) {
    heading(out, "Cross-Reference Analysis", '=');
    render_list(
        out,
        "Direct Function Calls",
        &cross_refs.function_usage.direct_function_calls,
        "No direct function calls found",
    );
    render_list(
        out,
        "Imported Functions",
        &cross_refs.function_usage.imported_functions,
        "No imported functions found",
    );
    render_list(
        out,
        "Shared Dependencies",
        &cross_refs.shared_dependencies,
        "No shared dependencies found",
    );
    out.push_str("  API Integration:\n");
    if cross_refs.api_integration.api_calls.is_empty() {
        out.push_str("    (No API calls found)\n");
    }
    for call in &cross_refs.api_integration.api_calls {
        out.push_str(&format!(
            "    {} {} via {}\n",
            call.http_method.to_uppercase(),
            call.endpoint.as_deref().unwrap_or("Unknown"),
            call.client_library
        ));
    }
}

fn render_file(out: &mut String, view: &FileView) {
    heading(out, &format!("{} Analysis", view.label.title()), '=');
    out.push_str(&format!(
        "  Functions: {}  Classes: {}  Function Calls: {}\n",
        view.metrics.function_count, view.metrics.class_count, view.metrics.call_count
    ));

    for part in &view.parts {
        out.push('\n');
        out.push_str(&format!("  {}\n", part.title()));
        match part {
            FilePart::NodeTypes(rows) => {
                for row in rows {
                    out.push_str(&format!("    {:<32} {}\n", row.node_type, row.count));
                }
            }
            FilePart::Relationships(rels) => {
                for rel in rels {
                    let kind = if rel.is_async { "Async" } else { "Sync" };
                    out.push_str(&format!(
                        "    {}.{} [{}]\n",
                        rel.class_name, rel.function, kind
                    ));
                }
            }
            FilePart::Dependencies(deps) => {
                for dep in deps {
                    out.push_str(&format!("    {} ({})\n", dep.function, dep.count));
                    for callee in &dep.dependencies {
                        out.push_str(&format!("      -> {}\n", callee));
                    }
                }
            }
            FilePart::ApiCalls(calls) => {
                for call in calls {
                    let arguments = serde_json::to_string(&call.arguments).unwrap_or_default();
                    out.push_str(&format!(
                        "    {} {} via {} {}\n",
                        call.http_method.to_uppercase(),
                        call.endpoint.as_deref().unwrap_or("Unknown"),
                        call.client_library,
                        arguments
                    ));
                }
            }
            FilePart::DecoratedFunctions(funcs) => {
                for func in funcs {
                    let kind = if func.is_async { "Async" } else { "Sync" };
                    let decorators: Vec<String> =
                        func.decorators.iter().map(|d| format!("@{}", d.name)).collect();
                    out.push_str(&format!(
                        "    {} [{}] {}\n",
                        func.name,
                        kind,
                        decorators.join(" ")
                    ));
                    for param in &func.parameters {
                        out.push_str(&format!("      {}\n", param));
                    }
                }
            }
            FilePart::ClassHierarchy(classes) => {
                for class in classes {
                    out.push_str(&format!("    {}\n", class.name));
                    if !class.parent_classes.is_empty() {
                        out.push_str(&format!(
                            "      parents: {}\n",
                            class.parent_classes.join(", ")
                        ));
                    }
                    if !class.methods.is_empty() {
                        out.push_str(&format!("      methods: {}\n", class.methods.join(", ")));
                    }
                }
            }
        }
    }
}

fn render_pair(
    out: &mut String,
    title: &str,
    (app_title, app): (&str, &[String]),
    (api_title, api): (&str, &[String]),
    empty: &str,
) {
    heading(out, title, '=');
    render_list(out, app_title, app, empty);
    render_list(out, api_title, api, empty)
}
