use crate::phy::{NetworkType, Physical80211};
use crate::traffic::{ConfigError, PayloadDistribution, TrafficKind, TrafficProfile};

#[test]
fn default_profile_derives_three_backoff_stages() {
    let tables = TrafficProfile::default().validate().expect("default profile");
    assert_eq!(tables.backoff_windows, vec![7, 15, 31]);
    assert_eq!(tables.backoff_stages(), 3);
    assert_eq!(tables.backoff_window(1), 7);
    assert_eq!(tables.backoff_window(3), 31);
    // 越界阶段被钳制
    assert_eq!(tables.backoff_window(0), 7);
    assert_eq!(tables.backoff_window(9), 31);

    let wide = TrafficProfile {
        min_backoff: 4,
        max_backoff: 128,
        ..TrafficProfile::default()
    };
    let windows = wide.validate().expect("valid profile").backoff_windows;
    assert_eq!(windows.len(), 6);
    assert!(windows.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn backoff_bounds_must_be_power_of_two_ratio() {
    for (min, max) in [(8, 24), (0, 8), (16, 8), (3, 7)] {
        let profile = TrafficProfile {
            min_backoff: min,
            max_backoff: max,
            ..TrafficProfile::default()
        };
        assert_eq!(
            profile.validate(),
            Err(ConfigError::BackoffBounds { min, max }),
            "min={min} max={max}"
        );
    }

    let single_stage = TrafficProfile {
        min_backoff: 16,
        max_backoff: 16,
        ..TrafficProfile::default()
    };
    assert_eq!(single_stage.backoff_stages(), Ok(1));
}

#[test]
fn sleep_table_has_awake_drowsy_and_forced_regions() {
    let profile = TrafficProfile {
        awake_time: 2,
        drowsy_time: 3,
        p_drowsy_sleep: 0.1,
        ..TrafficProfile::default()
    };
    let tables = profile.validate().expect("valid profile");
    assert_eq!(tables.sleep_probabilities, vec![0.0, 0.0, 0.1, 0.1, 0.1, 1.0]);
    assert_eq!(tables.sleep_probability(0), 0.0);
    assert_eq!(tables.sleep_probability(3), 0.1);
    assert_eq!(tables.sleep_probability(5), 1.0);
    assert_eq!(tables.sleep_probability(500), 1.0);
}

#[test]
fn zero_min_interarrival_disables_interarrival() {
    let profile = TrafficProfile {
        min_interarrival: 0,
        max_interarrival: 0,
        p_interarrival: 0.9,
        ..TrafficProfile::default()
    };
    let tables = profile.validate().expect("valid profile");
    assert_eq!(tables.p_interarrival, 0.0);
}

#[test]
fn invalid_probabilities_and_ranges_are_rejected() {
    let p = TrafficProfile {
        p_drowsy_sleep: 1.5,
        ..TrafficProfile::default()
    };
    assert_eq!(
        p.validate(),
        Err(ConfigError::Probability {
            name: "p_drowsy_sleep",
            value: 1.5
        })
    );

    let r = TrafficProfile {
        min_sleep: 10,
        max_sleep: 5,
        ..TrafficProfile::default()
    };
    assert_eq!(
        r.validate(),
        Err(ConfigError::InvertedRange {
            name: "sleep",
            min: 10,
            max: 5
        })
    );

    let a = TrafficProfile {
        arrival_rate: -0.1,
        ..TrafficProfile::default()
    };
    assert_eq!(a.validate(), Err(ConfigError::ArrivalRate(-0.1)));
}

#[test]
fn payload_distribution_validation_errors() {
    assert_eq!(
        PayloadDistribution::new(vec![], vec![], 1500),
        Err(ConfigError::EmptyPayloadDistribution)
    );
    assert_eq!(
        PayloadDistribution::new(vec![100, 200], vec![1.0], 1500),
        Err(ConfigError::PayloadLengthMismatch {
            bins: 2,
            probabilities: 1
        })
    );
    assert_eq!(
        PayloadDistribution::new(vec![100, 200, 300], vec![0.5, 0.4, 1.0], 1500),
        Err(ConfigError::NonMonotonicPayload {
            index: 1,
            value: 0.4
        })
    );
    assert_eq!(
        PayloadDistribution::new(vec![100, 200], vec![0.5, 0.9], 1500),
        Err(ConfigError::UnnormalizedPayload(0.9))
    );
    assert_eq!(
        PayloadDistribution::new(vec![100, 0], vec![0.5, 1.0], 1500),
        Err(ConfigError::ZeroPayloadBin { index: 1 })
    );
    assert_eq!(
        PayloadDistribution::new(vec![100], vec![1.0], 0),
        Err(ConfigError::ZeroBytesPerStep)
    );
}

#[test]
fn payload_within_tolerance_is_snapped_to_one() {
    let dist = PayloadDistribution::new(vec![100, 200], vec![0.5, 0.99995], 1500)
        .expect("within tolerance");
    assert_eq!(dist.cumulative, vec![0.5, 1.0]);
}

#[test]
fn sampling_picks_first_bin_strictly_above_draw() {
    let dist = PayloadDistribution::new(vec![1500, 3000, 4500], vec![0.2, 0.5, 1.0], 1500)
        .expect("valid distribution");
    assert_eq!(dist.sample_bin(0.0), 0);
    assert_eq!(dist.sample_bin(0.2), 1);
    assert_eq!(dist.sample_bin(0.49), 1);
    assert_eq!(dist.sample_bin(0.5), 2);
    assert_eq!(dist.sample_bin(0.9999), 2);
    assert_eq!(dist.sample_bin(1.0), 2);

    assert_eq!(dist.sample_steps(0.1), 1);
    assert_eq!(dist.sample_steps(0.3), 2);
    assert_eq!(dist.sample_steps(0.7), 3);
}

#[test]
fn bytes_round_up_to_whole_steps() {
    let dist = PayloadDistribution::single(1500);
    assert_eq!(dist.steps_for_bytes(1), 1);
    assert_eq!(dist.steps_for_bytes(1500), 1);
    assert_eq!(dist.steps_for_bytes(1501), 2);
    assert_eq!(dist.steps_for_bytes(3000), 2);
    assert_eq!(dist.steps_for_bytes(3001), 3);
}

#[test]
fn small_biased_distribution_spreads_remaining_mass() {
    let dist = PayloadDistribution::small_biased(1500, 0.8, 4);
    dist.validate().expect("valid distribution");
    assert_eq!(dist.bins, vec![1500, 3000, 4500, 6000]);
    assert_eq!(dist.cumulative[0], 0.8);
    assert_eq!(dist.cumulative[3], 1.0);
    assert!((dist.mean_steps() - 1.4).abs() < 1e-9);

    assert_eq!(PayloadDistribution::small_biased(1500, 0.5, 1).bins, vec![1500]);
}

#[test]
fn presets_validate_and_use_phy_arrival_rate() {
    let phy = Physical80211::from_payload_bytes(NetworkType::B, 1500);
    for kind in TrafficKind::PRESETS {
        let profile = kind.preset(&phy, 500_000.0).expect("preset exists");
        assert_eq!(profile.kind, kind);
        assert_eq!(profile.arrival_rate, phy.packet_arrival_rate(500_000.0));
        profile
            .validate()
            .unwrap_or_else(|e| panic!("{} preset invalid: {e}", kind.name()));
    }
    assert!(TrafficKind::Custom.preset(&phy, 500_000.0).is_none());
}

#[test]
fn constant_stream_never_sleeps_and_sends_single_steps() {
    let phy = Physical80211::from_payload_bytes(NetworkType::B, 1500);
    let profile = TrafficKind::ConstantStream
        .preset(&phy, 1_000_000.0)
        .expect("preset exists");
    assert_eq!(profile.min_sleep, 0);
    assert_eq!(profile.p_interarrival, 0.0);
    assert_eq!(profile.payload, PayloadDistribution::single(1500));
}

#[test]
fn traffic_kind_names_and_parse() {
    assert_eq!(TrafficKind::parse("YouTube"), Ok(TrafficKind::YouTube));
    assert_eq!(TrafficKind::parse("bt"), Ok(TrafficKind::BitTorrent));
    assert_eq!(TrafficKind::parse("skype_video"), Ok(TrafficKind::SkypeVideo));
    assert_eq!(TrafficKind::parse("constant-stream"), Ok(TrafficKind::ConstantStream));
    assert!(TrafficKind::parse("ftp").is_err());

    assert_eq!(TrafficKind::WebBrowsing.short_name(), "WB");
    assert_eq!(TrafficKind::Custom.short_name(), "XX");

    let kind: TrafficKind = serde_json::from_str("\"youtube\"").expect("parse kind");
    assert_eq!(kind, TrafficKind::YouTube);
    let kind: TrafficKind = serde_json::from_str("\"constant_stream\"").expect("parse kind");
    assert_eq!(kind, TrafficKind::ConstantStream);
}
