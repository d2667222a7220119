//! Customer records shown by the table example.

use serde::{Deserialize, Serialize};

/// Postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
}

/// A customer of the example brokerage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub investments: f64,
    pub date_joined: String,
    pub active: bool,
    pub address: Address,
}

impl Customer {
    fn new(
        id: u32,
        name: &str,
        investments: f64,
        date_joined: &str,
        active: bool,
        city: &str,
        state: &str,
    ) -> Self {
        let email = format!(
            "{}@example.com",
            name.to_ascii_lowercase().replace(' ', ".")
        );
        Self {
            id,
            name: name.to_string(),
            email,
            investments,
            date_joined: date_joined.to_string(),
            active,
            address: Address {
                city: city.to_string(),
                state: state.to_string(),
            },
        }
    }
}

/// Fixed customer list, ordered by id.
pub fn sample_customers() -> Vec<Customer> {
    vec![
        Customer::new(1, "Ann Melan", 25_000.0, "2019-03-14", true, "Sydney", "NSW"),
        Customer::new(2, "Rodney Marsh", 3_250.5, "2020-07-01", true, "Perth", "WA"),
        Customer::new(3, "Jane Kerr", 120_000.0, "2018-11-23", false, "Hobart", "TAS"),
        Customer::new(4, "David George", 7_500.0, "2021-01-09", true, "Brisbane", "QLD"),
        Customer::new(5, "Alison Smart", 48_900.75, "2017-05-30", true, "Melbourne", "VIC"),
        Customer::new(6, "Paul Stanley", 0.0, "2022-02-17", false, "Darwin", "NT"),
        Customer::new(7, "Eric Hunter", 15_300.0, "2016-09-12", true, "Adelaide", "SA"),
        Customer::new(8, "Mary Lopez", 62_000.0, "2020-12-05", true, "Canberra", "ACT"),
        Customer::new(9, "Tom Bradley", 980.25, "2023-04-21", true, "Geelong", "VIC"),
        Customer::new(10, "Lucy Chen", 33_100.0, "2019-08-08", false, "Cairns", "QLD"),
        Customer::new(11, "Brian Wood", 5_400.0, "2015-06-18", true, "Newcastle", "NSW"),
        Customer::new(12, "Sarah Dunn", 210_500.0, "2014-10-02", true, "Launceston", "TAS"),
    ]
}

/// Look up a customer by id.
pub fn find_customer(id: u32) -> Option<Customer> {
    sample_customers().into_iter().find(|c| c.id == id)
}
