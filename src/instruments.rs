/// A tracked instrument: display name, storage collection, chart color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub name: &'static str,
    pub collection: &'static str,
    pub color: &'static str,
}

/// Instruments served by `/api/chart-data`, in response order.
///
/// Collection names are storage identifiers and are kept verbatim,
/// including `Procta & Gamble`.
pub const INSTRUMENTS: &[Instrument] = &[
    Instrument {
        name: "SAP",
        collection: "SAP",
        color: "#0053e7",
    },
    Instrument {
        name: "Microsoft",
        collection: "Microsoft",
        color: "#00a2ed",
    },
    Instrument {
        name: "Nestlé",
        collection: "Nestle",
        color: "#d71421",
    },
    Instrument {
        name: "Procter & Gamble",
        collection: "Procta & Gamble",
        color: "#005eb8",
    },
    Instrument {
        name: "MSCI World",
        collection: "MSCI World",
        color: "#4CAF50",
    },
];

/// Chart color for an instrument name, if it is in the table.
pub fn color_for(name: &str) -> Option<&'static str> {
    INSTRUMENTS
        .iter()
        .find(|i| i.name == name)
        .map(|i| i.color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nestle_maps_to_ascii_collection() {
        let nestle = INSTRUMENTS.iter().find(|i| i.name == "Nestlé").unwrap();
        assert_eq!(nestle.collection, "Nestle");
    }

    #[test]
    fn unknown_name_has_no_color() {
        assert_eq!(color_for("SAP"), Some("#0053e7"));
        assert_eq!(color_for("Tesla"), None);
    }
}
