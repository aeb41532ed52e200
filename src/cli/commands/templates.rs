use std::path::Path;

use tracker_core::{format_percentage, TemplateService};
use tracker_domain::Template;

use super::{parse_id, read_json};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::Table;
use crate::session::ToastVariant;

pub(crate) const ACTIONS: &[&str] = &[
    "list", "show", "new", "create", "update", "delete", "validate", "test",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "templates",
        "Manage invoice extraction templates",
        "templates [list|show <id>|new|create <file>|update <id> <file>|delete <id>|validate <file>|test <template-id> <invoice-id>]",
        cmd_templates,
    )]
}

/// Reads, normalizes and validates a template file.
fn load_template(raw: Option<&&str>) -> Result<Template, CommandError> {
    let path = raw.ok_or_else(|| CommandError::InvalidArguments("A template file is required.".into()))?;
    let template: Template = read_json(Path::new(path))?;
    Ok(TemplateService::normalize(&template))
}

fn ensure_valid(template: &Template) -> CommandResult {
    let errors = TemplateService::validate(template);
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        output::error(error);
    }
    Err(CommandError::InvalidArguments(format!(
        "Template has {} problem(s).",
        errors.len()
    )))
}

fn cmd_templates(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase()).unwrap_or_else(|| "list".into());

    match action.as_str() {
        "new" => {
            output::raw(serde_json::to_string_pretty(&TemplateService::empty_template())?);
            Ok(())
        }
        "validate" => {
            let template = load_template(args.get(1))?;
            ensure_valid(&template)?;
            output::success(format!(
                "{} is valid ({} markers, {} fields).",
                TemplateService::display_name(&template),
                template.markers().len(),
                template.fields().len()
            ));
            Ok(())
        }
        "list" => {
            context.require_login()?;
            let templates = context.call(|client| client.list_templates())?;
            if templates.is_empty() {
                output::info("No templates yet. Start from `templates new`.");
                return Ok(());
            }
            let mut table = Table::new(&["Id", "Template", "Fields", "Updated"]).align_right(2);
            for template in &templates {
                table.push(vec![
                    template.template_id.map(|id| id.to_string()).unwrap_or_default(),
                    TemplateService::display_name(template),
                    template.fields().len().to_string(),
                    template.updated_at.clone().unwrap_or_default(),
                ]);
            }
            output::raw(table.render_within(context.table_width()));
            Ok(())
        }
        "show" => {
            context.require_login()?;
            let id = parse_id(args.get(1), "template id")?;
            let template = context.call(|client| client.get_template(id))?;
            output::section(TemplateService::display_name(&template));
            if let Some(description) = &template.description {
                output::raw(format!("  {}", description));
            }
            output::raw(serde_json::to_string_pretty(&template.template_data)?);
            Ok(())
        }
        "create" => {
            context.require_login()?;
            let template = load_template(args.get(1))?;
            ensure_valid(&template)?;
            let saved = context.call(|client| client.create_template(&template))?;
            context.notify(
                ToastVariant::Success,
                format!("Template saved: {}", TemplateService::display_name(&saved)),
            );
            Ok(())
        }
        "update" => {
            context.require_login()?;
            let id = parse_id(args.get(1), "template id")?;
            let template = load_template(args.get(2))?;
            ensure_valid(&template)?;
            context.call(|client| client.update_template(id, &template))?;
            context.notify(ToastVariant::Success, format!("Template {} updated.", id));
            Ok(())
        }
        "delete" => {
            context.require_login()?;
            let id = parse_id(args.get(1), "template id")?;
            context.call(|client| client.delete_template(id))?;
            context.notify(ToastVariant::Success, format!("Template {} deleted.", id));
            Ok(())
        }
        "test" => {
            context.require_login()?;
            let template_id = parse_id(args.get(1), "template id")?;
            let invoice_id = parse_id(args.get(2), "invoice id")?;
            let result = context.call(|client| client.test_template(template_id, invoice_id))?;

            let verdict = if result.success { "Matched" } else { "No match" };
            output::section(format!("Template test: {}", verdict));
            output::raw(format!(
                "  score {} | fields {}/{}",
                format_percentage(result.match_score),
                result.fields_matched,
                result.fields_total
            ));
            for (field, value) in &result.extracted_data {
                output::raw(format!("  {:<16} {}", field, value));
            }
            for error in result.errors.iter().flatten() {
                output::warning(error);
            }
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown templates action `{}`.",
            other
        ))),
    }
}
