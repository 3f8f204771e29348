//! Send-money page rendering

use walletweb_config::Config;
use walletweb_core::transfer::{step_url, Confirmation, Screen, StepNotice, TransferForm, SEND_MONEY_PATH};
use walletweb_core::{format_currency, CounterpartyRecord, FieldErrors, User};
use walletweb_utils::escape_html;

use crate::components::{error_message, snack_bar, SnackKind};
use crate::routes::activity::render_receipt;

/// Shown at step 1 when the destination did not match any account
pub const NOT_FOUND_MESSAGE: &str = "Cuenta no encontrada";

/// Shown at step 1 when the accounts could not be looked up
pub const UNAVAILABLE_MESSAGE: &str = "No pudimos buscar la cuenta, intentá de nuevo";

/// Page title of a screen
pub fn screen_title(screen: &Screen) -> &'static str {
    match screen {
        Screen::Receipt(_) => "Comprobante",
        _ => "Enviar dinero",
    }
}

/// Render the inner content of a screen
pub fn render_screen(screen: &Screen, config: &Config) -> String {
    match screen {
        Screen::List { records } => render_list(records),
        Screen::Destination { form, notice, errors } => render_destination(form, *notice, errors, config),
        Screen::Amount { form, recipient, errors } => render_amount(form, recipient.as_ref(), errors),
        Screen::Confirm(confirmation) => render_confirmation(confirmation, config),
        Screen::Receipt(receipt) => render_receipt(receipt.as_ref(), config),
    }
}

fn step_header(step: u8, title: &str) -> String {
    format!(
        r#"<div class='mb-6'>
    <p class='text-sm text-gray-500'>Paso {} de 3</p>
    <h2 class='text-2xl font-bold'>{}</h2>
</div>"#,
        step, title
    )
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type='hidden' name='{}' value='{}'>",
        name,
        escape_html(value)
    )
}

fn recipient_name(recipient: Option<&User>, form: &TransferForm) -> String {
    recipient
        .map(User::full_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| form.destination.trim().to_string())
}

fn render_list(records: &[CounterpartyRecord]) -> String {
    let rows = if records.is_empty() {
        "<p class='text-center text-gray-500 py-8'>No hay cuentas registradas</p>".to_string()
    } else {
        let items: String = records
            .iter()
            .map(|record| {
                let seed = TransferForm {
                    destination: record.origin.clone(),
                    amount: String::new(),
                };
                format!(
                    r#"<li><a href='{}' class='flex justify-between items-center px-4 py-3 hover:bg-gray-50'>
    <span class='font-medium'>{}</span><span class='text-sm text-gray-500'>{}</span>
</a></li>"#,
                    escape_html(&step_url(1, &seed, None)),
                    escape_html(&record.name),
                    escape_html(&record.origin)
                )
            })
            .collect();
        format!("<ul class='divide-y'>{}</ul>", items)
    };

    format!(
        r#"<div class='mb-6 flex items-center justify-between'>
    <h2 class='text-2xl font-bold'>Enviar dinero</h2>
    <a href='{}?step=1' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Nueva cuenta</a>
</div>
<div class='bg-white rounded-xl shadow-sm'>
    <h3 class='text-lg font-semibold px-4 pt-4 pb-2'>Últimas cuentas</h3>
    {}
</div>"#,
        SEND_MONEY_PATH, rows
    )
}

fn render_destination(form: &TransferForm, notice: Option<StepNotice>, errors: &FieldErrors, config: &Config) -> String {
    let notification = notice
        .map(|notice| match notice {
            StepNotice::NotFound => NOT_FOUND_MESSAGE,
            StepNotice::Unavailable => UNAVAILABLE_MESSAGE,
        })
        .map(|message| snack_bar(message, SnackKind::Error, config.transfer.notification_duration_ms))
        .unwrap_or_default();

    format!(
        r#"{}
<form method='post' action='{}' class='bg-white rounded-xl shadow-sm p-6'>
    {}
    <label for='destination' class='block text-sm font-medium text-gray-700 mb-1'>CVU o alias</label>
    <input id='destination' name='destination' type='text' value='{}' autocomplete='off' autofocus
        class='w-full px-3 py-2 border rounded-lg focus:ring-2 focus:ring-indigo-500'>
    {}
    <div class='flex justify-between mt-6'>
        <a href='{}' class='px-4 py-2 text-gray-600 hover:underline'>Cancelar</a>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Continuar</button>
    </div>
</form>
{}"#,
        step_header(1, "Agregá una nueva cuenta"),
        SEND_MONEY_PATH,
        hidden("step", "1"),
        escape_html(&form.destination),
        error_message(errors),
        SEND_MONEY_PATH,
        notification
    )
}

fn render_amount(form: &TransferForm, recipient: Option<&User>, errors: &FieldErrors) -> String {
    let back = TransferForm {
        destination: form.destination.clone(),
        amount: String::new(),
    };

    format!(
        r#"{}
<form method='post' action='{}' class='bg-white rounded-xl shadow-sm p-6'>
    {}{}
    <p class='text-sm text-gray-500 mb-4'>Vas a transferir a <span class='font-medium text-gray-900'>{}</span></p>
    <label for='amount' class='block text-sm font-medium text-gray-700 mb-1'>Monto</label>
    <input id='amount' name='amount' type='text' inputmode='decimal' value='{}' placeholder='0,00' autocomplete='off' autofocus
        class='w-full px-3 py-2 border rounded-lg focus:ring-2 focus:ring-indigo-500'>
    {}
    <div class='flex justify-between mt-6'>
        <a href='{}' class='px-4 py-2 text-gray-600 hover:underline'>Volver</a>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Continuar</button>
    </div>
</form>"#,
        step_header(2, "¿Cuánto querés transferir?"),
        SEND_MONEY_PATH,
        hidden("step", "2"),
        hidden("destination", &form.destination),
        escape_html(&recipient_name(recipient, form)),
        escape_html(&form.amount),
        error_message(errors),
        escape_html(&step_url(1, &back, None))
    )
}

fn render_confirmation(confirmation: &Confirmation, config: &Config) -> String {
    let form = &confirmation.form;
    let account = &confirmation.destination_account;
    let notification = confirmation
        .submit_error
        .as_deref()
        .map(|message| snack_bar(message, SnackKind::Error, config.transfer.notification_duration_ms))
        .unwrap_or_default();

    format!(
        r#"{}
<div class='bg-white rounded-xl shadow-sm p-6'>
    <div class='flex justify-between items-start mb-4'>
        <div>
            <p class='text-sm text-gray-500'>Vas a transferir</p>
            <p class='text-3xl font-bold'>{}</p>
        </div>
        <a href='{}' class='text-sm text-indigo-600 hover:underline'>Editar monto</a>
    </div>
    <div class='flex justify-between items-start border-t pt-4'>
        <div>
            <p class='text-sm text-gray-500'>Para</p>
            <p class='text-lg font-semibold'>{}</p>
            <p class='text-sm text-gray-500'>CVU {}</p>
            <p class='text-sm text-gray-500'>Alias {}</p>
        </div>
        <a href='{}' class='text-sm text-indigo-600 hover:underline'>Editar destino</a>
    </div>
    <form method='post' action='{}' class='mt-6 flex justify-end'>
        {}{}{}
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Transferir</button>
    </form>
</div>
{}"#,
        step_header(3, "Revisá que todo esté bien"),
        escape_html(&format_currency(confirmation.amount, &config.currency)),
        escape_html(&step_url(2, form, None)),
        escape_html(&recipient_name(confirmation.recipient.as_ref(), form)),
        escape_html(&account.cvu),
        escape_html(&account.alias),
        escape_html(&step_url(1, form, None)),
        SEND_MONEY_PATH,
        hidden("step", "3"),
        hidden("destination", &form.destination),
        hidden("amount", &form.amount),
        notification
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use walletweb_core::testing::{account, user};
    use walletweb_core::Decimal;

    fn form(destination: &str, amount: &str) -> TransferForm {
        TransferForm {
            destination: destination.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_empty_list_message() {
        let html = render_screen(&Screen::List { records: vec![] }, &Config::default());
        assert!(html.contains("No hay cuentas registradas"));
        assert!(html.contains("/send-money?step=1"));
    }

    #[test]
    fn test_list_links_seed_destination() {
        let records = vec![CounterpartyRecord {
            name: "Ana <Paz>".to_string(),
            origin: "ana.pago".to_string(),
        }];
        let html = render_screen(&Screen::List { records }, &Config::default());
        assert!(html.contains("/send-money?step=1&amp;destination=ana.pago"));
        assert!(html.contains("Ana &lt;Paz&gt;"));
        assert!(!html.contains("No hay cuentas registradas"));
    }

    #[test]
    fn test_destination_not_found_notification() {
        let screen = Screen::Destination {
            form: form("x'y", ""),
            notice: Some(StepNotice::NotFound),
            errors: FieldErrors::default(),
        };
        let html = render_screen(&screen, &Config::default());
        assert!(html.contains(NOT_FOUND_MESSAGE));
        assert!(!html.contains(UNAVAILABLE_MESSAGE));
        assert!(html.contains("data-duration='2000'"));
        assert!(html.contains("value='x&#39;y'"));
    }

    #[test]
    fn test_amount_step_shows_recipient() {
        let screen = Screen::Amount {
            form: form("ana.pago", ""),
            recipient: Some(user("2", "Ana", "Paz")),
            errors: FieldErrors::single("required", "Ingresá un monto"),
        };
        let html = render_screen(&screen, &Config::default());
        assert!(html.contains("Ana Paz"));
        assert!(html.contains("Ingresá un monto"));
        assert!(html.contains("name='destination' value='ana.pago'"));
    }

    #[test]
    fn test_confirmation_formats_amount_and_surfaces_error() {
        let confirmation = Confirmation {
            form: form("ana.pago", "1234.5"),
            amount: Decimal::from_str("1234.5").unwrap(),
            recipient: None,
            destination_account: account("20", "0000000000000000000020", "ana.pago", "2"),
            submit_error: Some("Saldo insuficiente".to_string()),
        };
        let html = render_screen(&Screen::Confirm(confirmation), &Config::default());
        assert!(html.contains("$ 1.234,50"));
        assert!(html.contains("0000000000000000000020"));
        assert!(html.contains("Saldo insuficiente"));
        assert!(html.contains("name='amount' value='1234.5'"));
    }
}
