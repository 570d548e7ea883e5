//! Detail screen state for a single selected listing.

use shared::protocol::Listing;

#[derive(Debug, Clone)]
pub struct DetailViewModel {
    selected: Listing,
}

impl DetailViewModel {
    pub fn new(selected: Listing) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> &Listing {
        &self.selected
    }

    /// `$450,000` for a sale, `$3,000/month` for a rental.
    pub fn display_price(&self) -> String {
        let amount = group_thousands(self.selected.price());
        if self.selected.is_rental() {
            format!("${amount}/month")
        } else {
            format!("${amount}")
        }
    }

    pub fn display_type(&self) -> String {
        let kind = if self.selected.is_rental() {
            "Rent"
        } else {
            "Sale"
        };
        format!("For {kind}")
    }
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
