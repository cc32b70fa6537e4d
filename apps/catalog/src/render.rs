use client_core::{DetailViewState, ListViewState};
use shared::domain::{Country, MISSING_TEXT};

pub fn list_state(state: &ListViewState) -> String {
    match state {
        ListViewState::Loading => "Loading countries...\n".to_string(),
        ListViewState::Error { message } => format!("error: {message}\n"),
        ListViewState::Success {
            total_countries: 0, ..
        } => "No countries found.\n".to_string(),
        ListViewState::Success {
            page,
            current_page,
            total_pages,
            total_countries,
        } => {
            let mut out = format!(
                "{:<4} {:<36} {:<20} {:>15}\n",
                "CODE", "NAME", "CAPITAL", "POPULATION"
            );
            for country in page {
                out.push_str(&format!(
                    "{:<4} {:<36} {:<20} {:>15}\n",
                    country.code,
                    country.common_name,
                    country.capital,
                    group_thousands(country.population)
                ));
            }
            let noun = if *total_countries == 1 { "country" } else { "countries" };
            out.push_str(&format!(
                "page {current_page}/{total_pages} ({total_countries} {noun})\n"
            ));
            out
        }
    }
}

pub fn detail_state(state: &DetailViewState) -> String {
    match state {
        DetailViewState::Loading => "Loading country...\n".to_string(),
        DetailViewState::Error { message } => format!("error: {message}\n"),
        DetailViewState::Success { country } => country_detail(country),
    }
}

fn country_detail(country: &Country) -> String {
    let currencies = country
        .currencies
        .iter()
        .map(|currency| {
            if currency.symbol.is_empty() {
                currency.name.clone()
            } else {
                format!("{} ({})", currency.name, currency.symbol)
            }
        })
        .collect::<Vec<_>>();
    let rows = [
        ("Name", country.common_name.clone()),
        ("Official name", country.official_name.clone()),
        ("Code", country.code.clone()),
        ("Capital", country.capital.clone()),
        ("Region", country.region.clone()),
        ("Subregion", country.subregion.clone()),
        ("Population", group_thousands(country.population)),
        (
            "Area",
            format!("{} km²", group_thousands(country.area.round() as u64)),
        ),
        ("Languages", join_or_missing(&country.languages)),
        ("Currencies", join_or_missing(&currencies)),
        ("Timezones", join_or_missing(&country.timezones)),
        ("Flag", or_missing(&country.flag_url)),
    ];

    rows.iter()
        .map(|(label, value)| format!("{label:<14} {value}\n"))
        .collect()
}

fn join_or_missing(values: &[String]) -> String {
    or_missing(&values.join(", "))
}

fn or_missing(value: &str) -> String {
    if value.is_empty() {
        MISSING_TEXT.to_string()
    } else {
        value.to_string()
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}
