use std::path::Path;

use tracker_core::{
    format_percentage, CurrencyFormatter, ExpenseService, SummaryService, TransformService,
    UsdFormatter, ValidationService, ALL_GROUP,
};
use tracker_domain::{
    ChartKind, DateFilter, ExpenseFormData, ExpenseGroup, ExpenseItem, GroupBy, Invoice,
    NamedTotal, Product, RawExpense, SortDirection, SortKey,
};

use super::{parse_id, read_json, ParsedArgs};
use crate::api::{InvoiceFilter, SummaryQuery};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::Table;
use crate::session::ToastVariant;

pub(crate) const FORM_ACTIONS: &[&str] = &["add", "edit"];
pub(crate) const CHART_KINDS: &[&str] = &["monthly", "category", "status", "paymentMethod"];

/// Upper bound on invoices pulled for client-side views.
const FETCH_LIMIT: u32 = 1000;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "expenses",
            "Group, filter and sort expenses",
            "expenses [--group itemType|store|date|card|all] [--category name] [--range all|3months|6months|1year] [--search term] [--sort key] [--asc|--desc] [--reset] [--server] [--sample file|--invoices file]",
            cmd_expenses,
        ),
        CommandEntry::new(
            "summary",
            "Statistics and top spending lists",
            "summary [--limit n] [--sample file|--invoices file]",
            cmd_summary,
        ),
        CommandEntry::new(
            "chart",
            "Dashboard chart series",
            "chart <monthly|category|status|paymentMethod> [--invoices file]",
            cmd_chart,
        ),
        CommandEntry::new(
            "expense",
            "Create or edit an expense",
            "expense <add|edit <id>> --store name [--category c] [--card c] [--date d] [--order n] [--total t] [--product name:price[:qty]]... [--dry-run]",
            cmd_expense,
        ),
    ]
}

fn money(context: &ShellContext, amount: f64) -> String {
    UsdFormatter.format_amount(amount, &context.config.currency)
}

fn fetch_invoices(context: &mut ShellContext) -> Result<Vec<Invoice>, CommandError> {
    context.require_login()?;
    let filter = InvoiceFilter::page(0, FETCH_LIMIT);
    context.call(|client| client.list_invoices(&filter))
}

/// Expense records from a sample file, an invoice dump, or the backend.
fn load_items(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> Result<Vec<ExpenseItem>, CommandError> {
    if let Some(path) = parsed.value("sample") {
        let raw: Vec<RawExpense> = read_json(Path::new(path))?;
        return Ok(TransformService::raw_to_app(&raw));
    }
    let invoices = match parsed.value("invoices") {
        Some(path) => read_json::<Vec<Invoice>>(Path::new(path))?,
        None => fetch_invoices(context)?,
    };
    Ok(TransformService::invoices_to_expense_groups(&invoices, context.today()).items())
}

/// Folds command options into the remembered query.
fn update_query(context: &mut ShellContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    if parsed.flag("reset") {
        context.query = Default::default();
        context.query.group_by = GroupBy::from_name(&context.config.default_group_by);
    }
    let query = &mut context.query;
    if let Some(group) = parsed.value("group") {
        query.group_by = GroupBy::from_name(group);
    }
    if let Some(category) = parsed.value("category") {
        query.category = Some(category.to_string()).filter(|c| !c.is_empty() && c.as_str() != ALL_GROUP);
    }
    if let Some(range) = parsed.value("range") {
        query.date_filter = DateFilter::from_name(range);
    }
    if let Some(term) = parsed.value("search") {
        query.search_term = Some(term.to_string()).filter(|t| !t.trim().is_empty());
    }
    if let Some(key) = parsed.value("sort") {
        let key: SortKey = key.parse().map_err(CommandError::InvalidArguments)?;
        query.sort = query.sort.toggle(key);
    }
    if parsed.flag("asc") {
        query.sort.direction = SortDirection::Asc;
    }
    if parsed.flag("desc") {
        query.sort.direction = SortDirection::Desc;
    }
    Ok(())
}

const QUERY_SWITCHES: &[&str] = &["asc", "desc", "reset", "server", "dry-run"];

fn cmd_expenses(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, QUERY_SWITCHES)?;
    update_query(context, &parsed)?;

    if parsed.flag("server") {
        return server_summary(context);
    }

    let items = load_items(context, &parsed)?;
    let groups = ExpenseService::apply(&items, &context.query, context.clock.as_ref());

    render_groups(context, &groups);
    let kept: usize = groups.iter().map(|group| group.count).sum();
    let filtered_total: f64 = groups.iter().map(|group| group.total).sum();
    let overall = SummaryService::filtered_total(&items);
    output::raw(format!(
        "\n{} of {} expenses, {} ({} of all spending)",
        kept,
        items.len(),
        money(context, filtered_total),
        format_percentage(SummaryService::share_percentage(filtered_total, overall))
    ));
    let categories = ExpenseService::categories(&items);
    if !categories.is_empty() {
        output::raw(format!("Categories: {}", categories.join(", ")));
    }
    Ok(())
}

fn server_summary(context: &mut ShellContext) -> CommandResult {
    context.require_login()?;
    let query = SummaryQuery {
        category: context.query.category.clone(),
        date_filter: context.query.date_filter,
        view_by: context.query.group_by,
    };
    let groups = context.call(|client| client.expense_summary(&query))?;
    render_groups(context, &groups);
    Ok(())
}

fn render_groups(context: &ShellContext, groups: &[ExpenseGroup]) {
    let query = &context.query;
    output::info(format!(
        "Grouped by {} | range {} | sorted by {} {}",
        query.group_by,
        query.date_filter,
        query.sort.key,
        match query.sort.direction {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    ));
    if groups.is_empty() {
        output::info("No expenses match the current filters.");
        return;
    }

    let width = context.table_width();
    for group in groups {
        output::section(format!(
            "{} ({} items, {})",
            group.name,
            group.count,
            money(context, group.total)
        ));
        let mut table =
            Table::new(&["Id", "Date", "Store", "Order", "Category", "Card", "Total"]).align_right(6);
        for item in &group.items {
            table.push(vec![
                item.id.to_string(),
                item.date.clone(),
                item.store.clone(),
                item.order_number.clone(),
                item.category.clone(),
                item.credit_card.clone(),
                money(context, item.total),
            ]);
        }
        output::raw(table.render_within(width));
    }
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let limit = parsed.number::<usize>("limit")?.unwrap_or(context.config.top_limit);
    let items = load_items(context, &parsed)?;

    let stats = SummaryService::statistics(&items);
    output::section("Expense statistics");
    output::raw(format!("  Count  : {}", stats.count));
    output::raw(format!("  Total  : {}", money(context, stats.total)));
    output::raw(format!("  Average: {}", money(context, stats.average)));
    output::raw(format!("  Highest: {}", money(context, stats.highest)));
    output::raw(format!("  Lowest : {}", money(context, stats.lowest)));

    render_top(context, "Top categories", &SummaryService::top_categories(&items, limit), stats.total);
    render_top(context, "Top stores", &SummaryService::top_stores(&items, limit), stats.total);
    render_top(
        context,
        "Top payment methods",
        &SummaryService::top_payment_methods(&items, limit),
        stats.total,
    );
    Ok(())
}

fn render_top(context: &ShellContext, title: &str, entries: &[NamedTotal], whole: f64) {
    output::section(title);
    if entries.is_empty() {
        output::info("Nothing to show.");
        return;
    }
    let mut table = Table::new(&["Name", "Total", "Share"]).align_right(1).align_right(2);
    for entry in entries {
        table.push(vec![
            entry.name.clone(),
            money(context, entry.total),
            format_percentage(SummaryService::share_percentage(entry.total, whole)),
        ]);
    }
    output::raw(table.render_within(context.table_width()));
}

fn cmd_chart(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[])?;
    let kind: ChartKind = parsed
        .positional
        .first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: chart <{}>", CHART_KINDS.join("|"))))?
        .parse()
        .map_err(CommandError::InvalidArguments)?;
    let invoices = match parsed.value("invoices") {
        Some(path) => read_json::<Vec<Invoice>>(Path::new(path))?,
        None => fetch_invoices(context)?,
    };

    let points = SummaryService::chart_data(&invoices, kind);
    if points.is_empty() {
        output::info("No data for this chart.");
        return Ok(());
    }
    let peak = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let mut table = Table::new(&["Label", "Value", ""]).align_right(1);
    for point in &points {
        let value = if kind == ChartKind::Status {
            format!("{}", point.value)
        } else {
            money(context, point.value)
        };
        let bar_len = if peak > 0.0 {
            (point.value / peak * 30.0).round() as usize
        } else {
            0
        };
        table.push(vec![point.name.clone(), value, "#".repeat(bar_len)]);
    }
    output::raw(table.render_within(context.table_width()));
    Ok(())
}

fn parse_product(raw: &str) -> Result<Product, CommandError> {
    let parts: Vec<&str> = raw.rsplitn(3, ':').collect();
    let invalid = || CommandError::InvalidArguments(format!("Invalid product `{}`; use name:price[:qty].", raw));
    let (name, price, quantity) = match parts.as_slice() {
        [price, name] => (*name, *price, "1"),
        [qty, price, name] => (*name, *price, *qty),
        _ => return Err(invalid()),
    };
    let price: f64 = price.trim().parse().map_err(|_| invalid())?;
    let quantity: u32 = quantity.trim().parse().map_err(|_| invalid())?;
    Ok(Product::new(name.trim(), price, quantity))
}

/// Applies `--field` options over `form`.
fn fill_form(form: &mut ExpenseFormData, parsed: &ParsedArgs<'_>) -> CommandResult {
    if let Some(store) = parsed.value("store") {
        form.store = store.to_string();
    }
    if let Some(category) = parsed.value("category") {
        form.category = category.to_string();
    }
    if let Some(card) = parsed.value("card") {
        form.credit_card = card.to_string();
    }
    if let Some(date) = parsed.value("date") {
        form.date = date.to_string();
    }
    if let Some(order) = parsed.value("order") {
        form.order_number = Some(order.to_string());
    }
    if let Some(total) = parsed.value("total") {
        form.total = Some(total.parse().map_err(|_| {
            CommandError::InvalidArguments("Please enter a valid total".into())
        })?);
    }
    let products = parsed.values("product");
    if !products.is_empty() {
        form.products = products
            .into_iter()
            .map(parse_product)
            .collect::<Result<_, _>>()?;
    }
    if form.total.is_none() && !form.products.is_empty() {
        form.total = Some(form.products.iter().map(Product::line_total).sum());
    }
    Ok(())
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, QUERY_SWITCHES)?;
    let action = parsed.positional.first().map(|a| a.to_lowercase());

    let mut form = match action.as_deref() {
        Some("add") => ExpenseFormData::default(),
        Some("edit") => {
            let id = parse_id(parsed.positional.get(1), "expense id")?;
            let items = load_items(context, &parsed)?;
            let item = items
                .iter()
                .find(|item| item.id == id)
                .ok_or_else(|| CommandError::Message(format!("Expense {} not found.", id)))?;
            TransformService::expense_to_form(item)
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: expense <add|edit <id>> --store name ...".into(),
            ))
        }
    };
    fill_form(&mut form, &parsed)?;

    let errors = ValidationService::validate_expense_form(&form);
    if !errors.is_empty() {
        return Err(CommandError::InvalidArguments(errors.join("; ")));
    }
    let draft = TransformService::form_to_invoice_draft(&form);

    if parsed.flag("dry-run") {
        output::raw(serde_json::to_string_pretty(&draft)?);
        return Ok(());
    }

    context.require_login()?;
    let result = match form.id {
        Some(id) => context.call(|client| client.update_invoice(id, &draft))?,
        None => context.call(|client| client.create_invoice(&draft))?,
    };
    let message = if result.message.is_empty() {
        match form.id {
            Some(_) => "Expense updated.".to_string(),
            None => "Expense created.".to_string(),
        }
    } else {
        result.message
    };
    context.notify(ToastVariant::Success, message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_accept_optional_quantity() {
        let lamp = parse_product("Desk lamp:19.99").unwrap();
        assert_eq!(lamp.quantity, 1);
        let cables = parse_product("USB-C: cable:4.50:3").unwrap();
        assert_eq!(cables.name, "USB-C: cable");
        assert_eq!(cables.quantity, 3);
        assert!(parse_product("nothing").is_err());
        assert!(parse_product("Lamp:abc").is_err());
    }

    #[test]
    fn form_total_defaults_to_product_sum() {
        let args = ["--store", "Target", "--product", "Lamp:10:2", "--product", "Bulb:2.5"];
        let parsed = ParsedArgs::parse(&args, &[]).unwrap();
        let mut form = ExpenseFormData::default();
        fill_form(&mut form, &parsed).unwrap();
        assert_eq!(form.store, "Target");
        assert_eq!(form.total, Some(22.5));
    }
}
