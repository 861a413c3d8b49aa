//! RAN parameter tree integration tests
//!
//! Builds the slice control trees the xApp sends and the KPM subscription it
//! requests, and checks their shape across the e2sm and xapp crates.

use integration_tests::{init_test_logging, TEST_PLMN};
use nextgric_common::{OctetString, SNssai};
use nextgric_e2sm::kpm::{build_subscription, TestCondType, TestCondition, REPORT_PERIOD_MS};
use nextgric_e2sm::rc::{
    handover_request, slice_level_prb_quota, slice_prb_quota_request, SlicePrbQuota,
};
use nextgric_e2sm::{element, list, ElementValue, RanParam, TreeError};
use nextgric_xapp::e2::kpm_style4_definition;
use nextgric_xapp::KpiField;

fn text(param: &RanParam) -> Option<&str> {
    match param.as_element()? {
        ElementValue::OctetString(os) => os.as_utf8(),
        _ => None,
    }
}

fn int(param: &RanParam) -> Option<i64> {
    match param.as_element()? {
        ElementValue::Integer(v) => Some(*v),
        _ => None,
    }
}

#[test]
fn test_prb_quota_tree_has_one_group_per_slice() {
    init_test_logging();

    let quotas = vec![
        SlicePrbQuota::uniform("1", "000001", 30),
        SlicePrbQuota::uniform("1", "000002", 50),
        SlicePrbQuota::uniform("128", "000128", 20),
    ];
    let tree = slice_level_prb_quota(TEST_PLMN, &quotas).unwrap();

    assert_eq!(tree.id, 1);
    assert_eq!(tree.kind(), "LIST");
    assert_eq!(tree.entries().len(), 3);
    assert_eq!(tree.node_count(), 1 + 10 * quotas.len());

    for (group, quota) in tree.entries().iter().zip(&quotas) {
        let ids: Vec<_> = group.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 10, 11, 12]);

        let member_list = &group[0].children()[0];
        assert_eq!(member_list.id, 4);
        let member = &member_list.entries()[0][0];
        assert_eq!(member.id, 5);
        assert_eq!(text(member.child(6).unwrap()), Some("00101"));

        let s_nssai = member.child(7).unwrap();
        assert_eq!(text(s_nssai.child(8).unwrap()), Some(quota.sst.as_str()));
        assert_eq!(text(s_nssai.child(9).unwrap()), Some(quota.sd.as_str()));

        for ratio in &group[1..] {
            assert_eq!(int(ratio), Some(quota.dedicated_ratio));
        }
    }
}

#[test]
fn test_prb_quota_walk_order_and_depth() {
    let quotas = [SlicePrbQuota::uniform("1", "000001", 40)];
    let tree = slice_level_prb_quota(TEST_PLMN, &quotas).unwrap();

    let mut visited = Vec::new();
    tree.walk(&mut |depth, param| visited.push((param.id, depth)));

    assert_eq!(
        visited,
        vec![
            (1, 0),
            (3, 1),
            (4, 2),
            (5, 3),
            (6, 4),
            (7, 4),
            (8, 5),
            (9, 5),
            (10, 1),
            (11, 1),
            (12, 1),
        ]
    );
}

#[test]
fn test_prb_quota_request_header() {
    let quotas = [SlicePrbQuota::uniform("1", "000001", 40)];
    let request = slice_prb_quota_request(TEST_PLMN, &quotas).unwrap();
    assert_eq!(request.header.ric_style_type, 2);
    assert_eq!(request.header.control_action_id, 6);

    let request = handover_request(TEST_PLMN, "1", "000080").unwrap();
    assert_eq!(request.header.ric_style_type, 3);
    assert_eq!(request.header.control_action_id, 1);

    let target = &request.message;
    assert_eq!(target.id, 1);
    let s_nssai = target.child(2).unwrap();
    assert_eq!(text(s_nssai.child(3).unwrap()), Some("1"));
    assert_eq!(text(s_nssai.child(4).unwrap()), Some("000080"));
    assert_eq!(text(target.child(5).unwrap()), Some("00101"));
}

#[test]
fn test_handover_walk_puts_plmn_before_slice() {
    let request = handover_request(TEST_PLMN, "1", "000080").unwrap();

    let mut visited = Vec::new();
    request
        .message
        .walk(&mut |depth, param| visited.push((param.id, depth, text(param))));

    assert_eq!(
        visited,
        vec![
            (1, 0, None),
            (5, 1, Some("00101")),
            (2, 1, None),
            (3, 2, Some("1")),
            (4, 2, Some("000080")),
        ]
    );
}

#[test]
fn test_empty_quota_set_is_rejected() {
    assert_eq!(
        slice_level_prb_quota(TEST_PLMN, &[]),
        Err(TreeError::EmptyList { id: 1 })
    );
}

#[test]
fn test_heterogeneous_list_is_rejected() {
    let result = list(
        1,
        vec![
            vec![element(10, 1_i64), element(11, 2_i64)],
            vec![element(10, 1_i64), element(12, 2_i64)],
        ],
    );
    assert!(matches!(
        result,
        Err(TreeError::HeterogeneousList { id: 1, index: 1, .. })
    ));
}

#[test]
fn test_subscription_filter_predicate_is_always_present() {
    let definition = kpm_style4_definition();

    for snssai in [SNssai::new(1), SNssai::with_sd_u32(1, 1), SNssai::with_sd_u32(128, 0x80)] {
        let subscription = build_subscription(&definition, snssai.filter_octets()).unwrap();
        assert_eq!(subscription.event_trigger.report_period_ms, REPORT_PERIOD_MS);
        assert_eq!(subscription.actions.len(), 1);

        let action = &subscription.actions[0];
        let predicate = &action.matching_condition;
        assert!(predicate.present);
        assert_eq!(predicate.cond_type, TestCondType::SNssai);
        assert_eq!(predicate.condition, TestCondition::Equal);
        assert_eq!(predicate.value, snssai.filter_octets());
        assert_eq!(predicate.value[0], snssai.sst);

        assert_eq!(action.subscript.measurements.len(), KpiField::ALL.len());
        assert_eq!(action.subscript.granularity_period_ms, REPORT_PERIOD_MS);
    }
}

#[test]
fn test_subscription_requests_advertised_measurements_in_order() {
    let definition = kpm_style4_definition();
    let subscription = build_subscription(&definition, [1, 0, 0, 1]).unwrap();

    let requested: Vec<_> = subscription.actions[0]
        .subscript
        .measurements
        .iter()
        .map(|info| info.meas_type.clone())
        .collect();
    let advertised: Vec<_> = KpiField::ALL
        .iter()
        .map(|field| nextgric_e2sm::kpm::MeasType::Name(OctetString::from_ascii(field.meas_name())))
        .collect();
    assert_eq!(requested, advertised);
}
