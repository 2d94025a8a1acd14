//! Value bands for synthetic live metrics.

/// An extra metric generated alongside the core fields.
#[derive(Debug, Clone, Copy)]
pub enum ExtraSpec {
    Number(&'static str, f64, f64),
    Percentage(&'static str, f64, f64),
    Text(&'static str, &'static str),
}

/// Ranges a proposal's synthetic metrics are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct MetricBand {
    pub adoption: (f64, f64),
    pub daily_transactions: (f64, f64),
    pub gas_per_day: (f64, f64),
    pub active_projects: (u32, u32),
    pub extras: &'static [ExtraSpec],
}

pub const DEFAULT_BAND: MetricBand = MetricBand {
    adoption: (10.0, 50.0),
    daily_transactions: (10_000.0, 500_000.0),
    gas_per_day: (1e9, 20e9),
    active_projects: (1, 20),
    extras: &[],
};

const BANDS: &[(u32, MetricBand)] = &[
    (
        20,
        MetricBand {
            adoption: (95.0, 99.0),
            daily_transactions: (800_000.0, 1_200_000.0),
            gas_per_day: (40e9, 60e9),
            active_projects: (400, 500),
            extras: &[ExtraSpec::Number("tokenContracts", 450_000.0, 500_000.0)],
        },
    ),
    (
        721,
        MetricBand {
            adoption: (90.0, 98.0),
            daily_transactions: (150_000.0, 300_000.0),
            gas_per_day: (10e9, 25e9),
            active_projects: (200, 260),
            extras: &[ExtraSpec::Number("collections", 80_000.0, 95_000.0)],
        },
    ),
    (
        1559,
        MetricBand {
            adoption: (85.0, 95.0),
            daily_transactions: (1_000_000.0, 1_500_000.0),
            gas_per_day: (100e9, 120e9),
            active_projects: (40, 60),
            extras: &[
                ExtraSpec::Number("ethBurnedPerDay", 500.0, 2_500.0),
                ExtraSpec::Percentage("type2Share", 80.0, 92.0),
            ],
        },
    ),
    (
        2535,
        MetricBand {
            adoption: (30.0, 45.0),
            daily_transactions: (5_000.0, 20_000.0),
            gas_per_day: (0.5e9, 2e9),
            active_projects: (15, 30),
            extras: &[],
        },
    ),
    (
        4337,
        MetricBand {
            adoption: (25.0, 40.0),
            daily_transactions: (200_000.0, 600_000.0),
            gas_per_day: (8e9, 15e9),
            active_projects: (60, 90),
            extras: &[
                ExtraSpec::Number("userOperationsPerDay", 300_000.0, 900_000.0),
                ExtraSpec::Text("entryPoint", "v0.7"),
            ],
        },
    ),
    (
        4844,
        MetricBand {
            adoption: (60.0, 75.0),
            daily_transactions: (15_000.0, 25_000.0),
            gas_per_day: (2e9, 4e9),
            active_projects: (20, 35),
            extras: &[
                ExtraSpec::Number("blobsPerBlock", 2.0, 6.0),
                ExtraSpec::Percentage("rollupShare", 70.0, 90.0),
            ],
        },
    ),
    (
        7702,
        MetricBand {
            adoption: (5.0, 15.0),
            daily_transactions: (1_000.0, 10_000.0),
            gas_per_day: (0.1e9, 0.5e9),
            active_projects: (5, 15),
            extras: &[ExtraSpec::Text("phase", "Pectra rollout")],
        },
    ),
];

/// Band for `number`, or [`DEFAULT_BAND`] for proposals without one.
pub fn band_for(number: u32) -> MetricBand {
    BANDS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, band)| *band)
        .unwrap_or(DEFAULT_BAND)
}
