use tracker_core::{CardService, CurrencyFormatter, UsdFormatter};
use tracker_domain::{NewCardNumber, NewPayment, NewPaymentCard};

use super::parse_id;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::Table;
use crate::session::ToastVariant;

pub(crate) const ACTIONS: &[&str] = &[
    "list",
    "show",
    "add",
    "rename",
    "delete",
    "add-number",
    "delete-number",
    "payments",
    "methods",
    "check",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "cards",
            "Manage payment cards and their numbers",
            "cards [list|show <id>|add <name>|rename <id> <name>|delete <id>|add-number <card-id> <last4> <MM/YY>|delete-number <id>|payments <number-id>|methods|check <card number>]",
            cmd_cards,
        ),
        CommandEntry::new(
            "pay",
            "Record a payment against an invoice",
            "pay <invoice-id> <card-number-id> <amount> [transaction-id]",
            cmd_pay,
        ),
    ]
}

fn cmd_cards(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let action = args.first().map(|a| a.to_lowercase()).unwrap_or_else(|| "list".into());

    if action == "check" {
        let number = args[1..].join("");
        if number.is_empty() {
            return Err(CommandError::InvalidArguments("usage: cards check <card number>".into()));
        }
        match (CardService::is_valid_card_number(&number), CardService::last_four(&number)) {
            (true, Some(last_four)) => {
                output::success(format!("Card number is valid; store it as ending in {}.", last_four))
            }
            _ => output::warning("Card number failed the checksum."),
        }
        return Ok(());
    }

    context.require_login()?;
    match action.as_str() {
        "list" => list_cards(context),
        "methods" => {
            let cards = context.call(|client| client.list_cards())?;
            for label in CardService::payment_method_options(&cards) {
                output::raw(format!("  {}", label));
            }
            Ok(())
        }
        "show" => {
            let id = parse_id(args.get(1), "card id")?;
            let card = context.call(|client| client.get_card(id))?;
            output::section(&card.card_name);
            let today = context.today();
            for number in &card.card_numbers {
                let status = match CardService::is_expired(number, today) {
                    Ok(true) => "expired",
                    Ok(false) => "active",
                    Err(_) => "invalid expiry",
                };
                output::raw(format!(
                    "  [{}] {} (exp {}, {})",
                    number.card_number_id,
                    CardService::label(&card, number),
                    number.expiration_date,
                    status
                ));
            }
            Ok(())
        }
        "add" => {
            let name = args[1..].join(" ");
            if name.trim().is_empty() {
                return Err(CommandError::InvalidArguments("usage: cards add <name>".into()));
            }
            let card = context.call(|client| {
                client.add_card(&NewPaymentCard {
                    card_name: name.trim().to_string(),
                    user_id: None,
                })
            })?;
            context.notify(
                ToastVariant::Success,
                format!("Card `{}` added (id {}).", card.card_name, card.card_id),
            );
            Ok(())
        }
        "rename" => {
            let id = parse_id(args.get(1), "card id")?;
            let name = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
            if name.trim().is_empty() {
                return Err(CommandError::InvalidArguments("usage: cards rename <id> <name>".into()));
            }
            context.call(|client| client.rename_card(id, name.trim()))?;
            context.notify(ToastVariant::Success, format!("Card {} renamed.", id));
            Ok(())
        }
        "delete" => {
            let id = parse_id(args.get(1), "card id")?;
            context.call(|client| client.delete_card(id))?;
            context.notify(ToastVariant::Success, format!("Card {} deleted.", id));
            Ok(())
        }
        "add-number" => {
            let card_id = parse_id(args.get(1), "card id")?;
            let (Some(last_four), Some(expiration)) = (args.get(2), args.get(3)) else {
                return Err(CommandError::InvalidArguments(
                    "usage: cards add-number <card-id> <last4> <MM/YY>".into(),
                ));
            };
            CardService::validate_new_number(last_four, expiration)?;
            let number = context.call(|client| {
                client.add_card_number(&NewCardNumber {
                    card_id,
                    last_four: last_four.to_string(),
                    expiration_date: expiration.to_string(),
                })
            })?;
            context.notify(
                ToastVariant::Success,
                format!("Added number ending in {}.", number.last_four),
            );
            Ok(())
        }
        "delete-number" => {
            let id = parse_id(args.get(1), "card number id")?;
            context.call(|client| client.delete_card_number(id))?;
            context.notify(ToastVariant::Success, format!("Card number {} removed.", id));
            Ok(())
        }
        "payments" => {
            let id = parse_id(args.get(1), "card number id")?;
            let payments = context.call(|client| client.payments_for_card_number(id))?;
            if payments.is_empty() {
                output::info("No payments recorded for this card number.");
                return Ok(());
            }
            let mut table = Table::new(&["Payment", "Invoice", "Amount", "Date", "Transaction"])
                .align_right(2);
            for payment in payments {
                table.push(vec![
                    payment.payment_id.to_string(),
                    payment.invoice_id.to_string(),
                    UsdFormatter.format_amount(payment.amount, &context.config.currency),
                    payment.payment_date,
                    payment.transaction_id,
                ]);
            }
            output::raw(table.render_within(context.table_width()));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown cards action `{}`.",
            other
        ))),
    }
}

fn list_cards(context: &mut ShellContext) -> CommandResult {
    let cards = context.call(|client| client.list_cards())?;
    if cards.is_empty() {
        output::info("No payment cards yet. Add one with `cards add <name>`.");
        return Ok(());
    }
    let today = context.today();
    let mut table = Table::new(&["Id", "Card", "Numbers", "Expired"]).align_right(2).align_right(3);
    for card in &cards {
        let expired = card
            .card_numbers
            .iter()
            .filter(|number| CardService::is_expired(number, today).unwrap_or(false))
            .count();
        table.push(vec![
            card.card_id.to_string(),
            card.card_name.clone(),
            card.card_numbers.len().to_string(),
            expired.to_string(),
        ]);
    }
    output::raw(table.render_within(context.table_width()));
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let invoice_id = parse_id(args.first(), "invoice id")?;
    let card_number_id = parse_id(args.get(1), "card number id")?;
    let amount: f64 = args
        .get(2)
        .and_then(|raw| raw.trim_start_matches('$').parse().ok())
        .filter(|value: &f64| value.is_finite() && *value > 0.0)
        .ok_or_else(|| CommandError::InvalidArguments("Please enter a valid amount".into()))?;
    let transaction_id = args.get(3).map(|t| t.to_string()).unwrap_or_default();
    context.require_login()?;

    let payment = context.call(|client| {
        client.make_payment(&NewPayment {
            invoice_id,
            card_number_id,
            amount,
            transaction_id,
        })
    })?;
    context.notify(
        ToastVariant::Success,
        format!(
            "Payment {} of {} recorded for invoice {}.",
            payment.payment_id,
            UsdFormatter.format_amount(payment.amount, &context.config.currency),
            invoice_id
        ),
    );
    Ok(())
}
