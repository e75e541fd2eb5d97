//! Locale and currency preference commands.

use clap::Subcommand;

use marigold_core::CurrencyCode;

use super::context::Context;
use super::CliError;

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show the persisted locale and currency
    Show,
    /// Set the locale sent with every request (e.g. en-US)
    Locale { locale: String },
    /// Set the display currency (USD, EUR, GBP, CAD, AUD)
    Currency { currency: CurrencyCode },
}

pub fn run(ctx: &Context, action: &PrefsAction) -> Result<(), CliError> {
    let prefs = ctx.client.prefs();
    match action {
        PrefsAction::Show => {}
        PrefsAction::Locale { locale } => prefs.set_locale(locale),
        PrefsAction::Currency { currency } => prefs.set_currency(*currency),
    }
    println!("locale: {}", prefs.locale());
    println!("currency: {}", prefs.currency().code());
    Ok(())
}
