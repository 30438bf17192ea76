// ── Run summary ──

use serde::Serialize;

pub const CSV_HEADER: &str = "device,interface,ip_address";

/// Written in the address column when an interface has no bound address.
pub const NONE_MARKER: &str = "None";

/// One device's row: its name, first interface, and bound address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub device: String,
    pub interface: String,
    pub ip_address: String,
}

impl SummaryRow {
    pub fn new(device: &str, interface: &str, ip_address: Option<String>) -> Self {
        Self {
            device: device.to_owned(),
            interface: interface.to_owned(),
            ip_address: ip_address.unwrap_or_else(|| NONE_MARKER.to_owned()),
        }
    }

    fn csv_line(&self) -> String {
        format!("{},{},{}", self.device, self.interface, self.ip_address)
    }
}

/// Outcome of a successful run, one row per device in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Header plus one line per row, `\n`-joined, no trailing newline,
    /// no quoting.
    pub fn to_csv(&self) -> String {
        std::iter::once(CSV_HEADER.to_owned())
            .chain(self.rows.iter().map(SummaryRow::csv_line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn csv_is_exact() {
        let summary = Summary {
            rows: vec![
                SummaryRow::new("switch1-a1b2c3", "Ethernet1", Some("10.0.0.0/31".into())),
                SummaryRow::new("switch2-d4e5f6", "Ethernet1", Some("10.0.0.1/31".into())),
            ],
        };
        assert_eq!(
            summary.to_csv(),
            "device,interface,ip_address\n\
             switch1-a1b2c3,Ethernet1,10.0.0.0/31\n\
             switch2-d4e5f6,Ethernet1,10.0.0.1/31"
        );
    }

    #[test]
    fn missing_address_uses_marker() {
        let row = SummaryRow::new("sw", "eth0", None);
        assert_eq!(row.ip_address, "None");
    }

    #[test]
    fn empty_summary_is_header_only() {
        assert_eq!(Summary::default().to_csv(), CSV_HEADER);
    }
}
