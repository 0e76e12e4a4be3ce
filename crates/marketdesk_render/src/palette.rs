/// Line colors for the dashboard charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub ltp: String,
    pub ltp_ma: String,
    pub net_oi: String,
    pub net_oi_ma: String,
    pub net_dex: String,
    pub net_dex_ma: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ltp: "#1a5a99".to_string(),
            ltp_ma: "#4682b4".to_string(),
            net_oi: "#b40000".to_string(),
            net_oi_ma: "#ce0707ff".to_string(),
            net_dex: "#cf1c70ff".to_string(),
            net_dex_ma: "#e20b9aff".to_string(),
        }
    }
}
