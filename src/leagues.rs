/// A league covered by the warm pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct League {
    pub id: i64,
    pub name: &'static str,
}

/// Leagues the bootstrapper iterates over, with their TheSportsDB ids.
pub const LEAGUES: &[League] = &[
    League { id: 4328, name: "English Premier League" },
    League { id: 4335, name: "Spanish La Liga" },
    League { id: 4331, name: "German Bundesliga" },
    League { id: 4332, name: "Italian Serie A" },
    League { id: 4334, name: "French Ligue 1" },
    League { id: 4344, name: "Portuguese Primeira Liga" },
    League { id: 4337, name: "Dutch Eredivisie" },
    League { id: 4480, name: "UEFA Champions League" },
];
