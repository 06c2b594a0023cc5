//! Print the plan table.

use imagify_core::{CurrencyCode, Plan};

/// Render the plan table for a currency.
#[must_use]
pub fn render(currency: CurrencyCode) -> String {
    let mut out = format!("{:<10} {:>8} {:>10}\n", "PLAN", "CREDITS", "PRICE");
    for plan in Plan::ALL {
        out.push_str(&format!(
            "{:<10} {:>8} {:>6} {}\n",
            plan.as_str(),
            plan.credits(),
            plan.amount(),
            currency.code()
        ));
    }
    out
}

/// Print the plan table.
pub fn print(currency: CurrencyCode) {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render(currency));
    }
}
