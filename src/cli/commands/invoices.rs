use tracker_core::{CurrencyFormatter, UsdFormatter};
use tracker_domain::{Displayable, Invoice, InvoiceStatus};

use super::{parse_id, ParsedArgs};
use crate::api::InvoiceFilter;
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::Table;
use crate::session::ToastVariant;

pub(crate) const INVOICE_ACTIONS: &[&str] =
    &["list", "show", "delete", "batch-delete", "category", "tag"];
pub(crate) const CATALOG_ACTIONS: &[&str] = &["list", "add", "delete"];

const DEFAULT_PAGE: u32 = 50;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "invoices",
            "Browse and manage invoices",
            "invoices [list [--skip n] [--limit n] [--status s] [--category c] [--tag t] [--search q] [--from d] [--to d] [--min x] [--max x]|show <id>|delete <id>|batch-delete <id>...|category <name>|tag <name>]",
            cmd_invoices,
        ),
        CommandEntry::new(
            "categories",
            "List, add or delete invoice categories",
            "categories [list|add <name>|delete <name>]",
            cmd_categories,
        ),
        CommandEntry::new(
            "tags",
            "List, add or delete invoice tags",
            "tags [list|add <tag>|delete <tag>]",
            cmd_tags,
        ),
    ]
}

fn money(context: &ShellContext, amount: Option<f64>) -> String {
    amount
        .map(|value| UsdFormatter.format_amount(value, &context.config.currency))
        .unwrap_or_else(|| "-".into())
}

fn list_filter(parsed: &ParsedArgs<'_>) -> Result<InvoiceFilter, CommandError> {
    let status = parsed
        .value("status")
        .map(|raw| raw.parse::<InvoiceStatus>())
        .transpose()
        .map_err(CommandError::InvalidArguments)?;
    Ok(InvoiceFilter {
        skip: Some(parsed.number("skip")?.unwrap_or(0)),
        limit: Some(parsed.number("limit")?.unwrap_or(DEFAULT_PAGE)),
        status,
        category: parsed.value("category").map(str::to_string),
        search: parsed.value("search").map(str::to_string),
        start_date: parsed.value("from").map(str::to_string),
        end_date: parsed.value("to").map(str::to_string),
        tag: parsed.value("tag").map(str::to_string),
        min_amount: parsed.number("min")?,
        max_amount: parsed.number("max")?,
    })
}

fn render_invoices(context: &ShellContext, invoices: &[Invoice]) {
    if invoices.is_empty() {
        output::info("No invoices found.");
        return;
    }
    let mut table = Table::new(&["Id", "Merchant", "Date", "Status", "Categories", "Total"])
        .align_right(5);
    for invoice in invoices {
        table.push(vec![
            invoice.invoice_id.to_string(),
            invoice.merchant_name.clone().unwrap_or_default(),
            invoice.purchase_date.clone().unwrap_or_default(),
            invoice.status.label().to_string(),
            invoice.categories.join(", "),
            money(context, invoice.grand_total),
        ]);
    }
    output::raw(table.render_within(context.table_width()));
    output::info(format!("{} invoice(s).", invoices.len()));
}

fn show_invoice(context: &mut ShellContext, id: i64) -> CommandResult {
    let invoice = context.call(|client| client.get_invoice(id))?;
    output::section(invoice.display_label());
    let rows = [
        ("File", invoice.file_name.clone()),
        ("Order", invoice.order_number.clone()),
        ("Date", invoice.purchase_date.clone()),
        ("Payment", invoice.payment_method.clone()),
        ("Status", Some(invoice.status.label().to_string())),
        ("Shipping", invoice.shipping_handling.map(|v| money(context, Some(v)))),
        ("Tax", invoice.estimated_tax.map(|v| money(context, Some(v)))),
        ("Total", Some(money(context, invoice.grand_total))),
        ("Categories", Some(invoice.categories.join(", "))),
        ("Tags", Some(invoice.tags.join(", "))),
        ("Notes", invoice.notes.clone()),
    ];
    for (label, value) in rows {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            output::raw(format!("  {:<10}: {}", label, value));
        }
    }

    if !invoice.items.is_empty() {
        let mut table = Table::new(&["Item", "Qty", "Unit", "Line"])
            .align_right(1)
            .align_right(2)
            .align_right(3);
        for line in &invoice.items {
            table.push(vec![
                line.product_name.clone(),
                line.quantity.to_string(),
                money(context, Some(line.unit_price)),
                money(context, Some(line.line_total())),
            ]);
        }
        output::raw(table.render_within(context.table_width()));
    }

    let payments = if invoice.payments.is_empty() {
        context.call(|client| client.payments_for_invoice(id))?
    } else {
        invoice.payments.clone()
    };
    if !payments.is_empty() {
        output::section("Payments");
        for payment in payments {
            output::raw(format!(
                "  #{} {} via card number {} ({})",
                payment.payment_id,
                money(context, Some(payment.amount)),
                payment.card_number_id,
                payment.payment_date
            ));
        }
    }
    Ok(())
}

/// Interactive sessions ask before destructive calls.
fn confirmed(context: &ShellContext, prompt: &str) -> Result<bool, CommandError> {
    if context.mode() == CliMode::Script {
        return Ok(true);
    }
    io::confirm_action(&context.prompt_theme, prompt, false)
}

fn cmd_invoices(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.require_login()?;
    let parsed = ParsedArgs::parse(args, &[])?;
    let action = parsed
        .positional
        .first()
        .map(|a| a.to_lowercase())
        .unwrap_or_else(|| "list".into());

    match action.as_str() {
        "list" => {
            let filter = list_filter(&parsed)?;
            let invoices = context.call(|client| client.list_invoices(&filter))?;
            render_invoices(context, &invoices);
        }
        "show" => {
            let id = parse_id(parsed.positional.get(1), "invoice id")?;
            show_invoice(context, id)?;
        }
        "delete" => {
            let id = parse_id(parsed.positional.get(1), "invoice id")?;
            if !confirmed(context, &format!("Delete invoice {}?", id))? {
                output::info("Operation cancelled.");
                return Ok(());
            }
            context.call(|client| client.delete_invoice(id))?;
            context.notify(ToastVariant::Success, format!("Invoice {} deleted.", id));
        }
        "batch-delete" => {
            let ids = parsed.positional[1..]
                .iter()
                .map(|raw| parse_id(Some(raw), "invoice id"))
                .collect::<Result<Vec<_>, _>>()?;
            if ids.is_empty() {
                return Err(CommandError::InvalidArguments(
                    "usage: invoices batch-delete <id>...".into(),
                ));
            }
            if !confirmed(context, &format!("Delete {} invoices?", ids.len()))? {
                output::info("Operation cancelled.");
                return Ok(());
            }
            let result = context.call(|client| client.batch_delete_invoices(&ids))?;
            let message = if result.message.is_empty() {
                format!("{} invoices deleted.", ids.len())
            } else {
                result.message
            };
            context.notify(ToastVariant::Success, message);
        }
        "category" | "tag" => {
            let name = parsed.positional.get(1).ok_or_else(|| {
                CommandError::InvalidArguments(format!("usage: invoices {} <name>", action))
            })?;
            let invoices = if action == "category" {
                context.call(|client| client.invoices_in_category(name))?
            } else {
                context.call(|client| client.invoices_with_tag(name))?
            };
            render_invoices(context, &invoices);
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "Unknown invoices action `{}`.",
                other
            )))
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Catalog {
    Categories,
    Tags,
}

impl Catalog {
    fn noun(self) -> &'static str {
        match self {
            Catalog::Categories => "category",
            Catalog::Tags => "tag",
        }
    }
}

fn run_catalog(context: &mut ShellContext, catalog: Catalog, args: &[&str]) -> CommandResult {
    context.require_login()?;
    let action = args.first().map(|a| a.to_lowercase()).unwrap_or_else(|| "list".into());
    let name = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();

    match action.as_str() {
        "list" => {
            let names = match catalog {
                Catalog::Categories => context.call(|client| client.list_categories())?,
                Catalog::Tags => context.call(|client| client.list_tags())?,
            };
            if names.is_empty() {
                output::info(format!("No {} entries yet.", catalog.noun()));
            }
            for name in names {
                output::raw(format!("  {}", name));
            }
            Ok(())
        }
        "add" | "delete" if name.trim().is_empty() => Err(CommandError::InvalidArguments(format!(
            "A {} name is required.",
            catalog.noun()
        ))),
        "add" => {
            let ack = match catalog {
                Catalog::Categories => context.call(|client| client.add_category(&name))?,
                Catalog::Tags => context.call(|client| client.add_tag(&name))?,
            };
            let message = if ack.message.is_empty() {
                format!("Added {} `{}`.", catalog.noun(), name)
            } else {
                ack.message
            };
            context.notify(ToastVariant::Success, message);
            Ok(())
        }
        "delete" => {
            if !confirmed(context, &format!("Delete {} `{}`?", catalog.noun(), name))? {
                output::info("Operation cancelled.");
                return Ok(());
            }
            match catalog {
                Catalog::Categories => context.call(|client| client.delete_category(&name))?,
                Catalog::Tags => context.call(|client| client.delete_tag(&name))?,
            };
            context.notify(
                ToastVariant::Success,
                format!("Deleted {} `{}`.", catalog.noun(), name),
            );
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown action `{}`.",
            other
        ))),
    }
}

fn cmd_categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    run_catalog(context, Catalog::Categories, args)
}

fn cmd_tags(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    run_catalog(context, Catalog::Tags, args)
}
