use proptest::prelude::*;
use std::collections::BTreeMap;
use underwrite_core::{
    Branch, ComparisonOperator, ConditionSpec, DecisionTreeNode, RoutingContext, RuleInput,
    RuleOverride,
};
use underwrite_runtime::{
    default_rules, AggregateOutcome, ConfigurationError, DecisionTree, RuleCatalog, RuleEvaluator,
    TreeRouter,
};

fn banded_tree() -> Vec<DecisionTreeNode> {
    vec![
        DecisionTreeNode::condition(
            "score",
            ConditionSpec::numeric_range(
                "bureau_score",
                vec![
                    Branch::new("Low").with_range(None, Some(600.0)),
                    Branch::new("Mid").with_range(Some(600.0), Some(700.0)),
                    Branch::new("High").with_range(Some(700.0), None),
                ],
            )
            .with_null_branch("Low"),
        )
        .root(),
        DecisionTreeNode::strategy("low", "subprime").child_of("score", "Low"),
        DecisionTreeNode::strategy("mid", "near_prime").child_of("score", "Mid"),
        DecisionTreeNode::condition(
            "channel",
            ConditionSpec::categorical(
                "channel",
                vec![
                    Branch::new("Digital").with_values(["web", "mobile"]),
                    Branch::new("other"),
                ],
            ),
        )
        .child_of("score", "High"),
        DecisionTreeNode::strategy("digital", "prime_digital").child_of("channel", "Digital"),
        DecisionTreeNode::strategy("branch", "prime_branch").child_of("channel", "other"),
    ]
}

fn channel() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["web", "MOBILE", "branch", "phone", ""]).prop_map(str::to_string))
}

fn passing_applicant() -> impl Strategy<Value = RuleInput> {
    (
        580.0..850.0f64,
        0.0..0.45f64,
        300.0..20_000.0f64,
        18.0..60.0f64,
        3u32..=60,
        0.5..30.0f64,
        1_000.0..50_000.0f64,
        0u32..=2,
    )
        .prop_map(
            |(credit_score, dti, income, age, term, years, amount, delinquencies)| RuleInput {
                credit_score: Some(credit_score),
                dti_ratio: Some(dti),
                monthly_income: Some(income),
                age: Some(age),
                term_months: Some(term),
                years_employed: Some(years),
                loan_amount: Some(amount),
                delinquencies_12m: Some(delinquencies),
                bankruptcies: Some(0),
                national_id_verified: Some(true),
                employment_status: Some("employed".to_string()),
                ..Default::default()
            },
        )
}

proptest! {
    #[test]
    fn routing_is_deterministic(score in prop::option::of(300.0..900.0f64), channel in channel()) {
        let tree = DecisionTree::build(banded_tree(), None).unwrap();
        let context = RoutingContext {
            bureau_score: score,
            channel,
            ..Default::default()
        };
        let first = tree.route(&context).unwrap();
        let second = tree.route(&context).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn bands_are_half_open(score in 300.0..900.0f64) {
        let context = RoutingContext {
            bureau_score: Some(score),
            channel: Some("web".to_string()),
            ..Default::default()
        };
        let result = TreeRouter::route(&context, &banded_tree(), None).unwrap();
        let expected = if score < 600.0 {
            "Low"
        } else if score < 700.0 {
            "Mid"
        } else {
            "High"
        };
        prop_assert_eq!(result.path[0].branch_taken.as_str(), expected);
    }

    #[test]
    fn band_boundary_routes_to_upper_band(boundary in prop::sample::select(vec![600.0, 700.0])) {
        let context = RoutingContext {
            bureau_score: Some(boundary),
            channel: Some("web".to_string()),
            ..Default::default()
        };
        let result = TreeRouter::route(&context, &banded_tree(), None).unwrap();
        let expected = if boundary == 600.0 { "Mid" } else { "High" };
        prop_assert_eq!(result.path[0].branch_taken.as_str(), expected);
    }

    #[test]
    fn missing_binary_attribute_follows_null_branch(
        score in prop::option::of(300.0..900.0f64),
        repaid in prop::option::of(0u32..10),
    ) {
        let nodes = vec![
            DecisionTreeNode::condition(
                "existing",
                ConditionSpec::binary("is_existing_customer", ComparisonOperator::Eq, true, "Yes", "No")
                    .with_null_branch("Yes"),
            )
            .root(),
            DecisionTreeNode::strategy("yes", "repeat").child_of("existing", "Yes"),
            DecisionTreeNode::strategy("no", "standard").child_of("existing", "No"),
        ];
        let context = RoutingContext {
            bureau_score: score,
            prior_loans_repaid: repaid,
            ..Default::default()
        };
        let result = TreeRouter::route(&context, &nodes, None).unwrap();
        prop_assert_eq!(result.strategy_id.as_deref(), Some("repeat"));
    }

    #[test]
    fn parent_cycles_are_rejected(length in 2usize..12) {
        let mut nodes: Vec<DecisionTreeNode> = (0..length)
            .map(|i| {
                DecisionTreeNode::annotation(format!("n{}", i), "link")
                    .child_of(format!("n{}", (i + length - 1) % length), "next")
            })
            .collect();
        nodes[0] = nodes[0].clone().root();

        let err = DecisionTree::build(nodes, Some("fallback".to_string())).unwrap_err();
        prop_assert!(matches!(err, ConfigurationError::Cycle(_)));
    }

    #[test]
    fn passing_hard_rules_approve(input in passing_applicant()) {
        let evaluation = RuleEvaluator::evaluate(&input, &RuleCatalog::defaults());
        prop_assert_eq!(evaluation.outcome, AggregateOutcome::AutoApprove);
        prop_assert!(evaluation.reasons.is_empty());
    }

    #[test]
    fn disabling_a_failing_rule_removes_it(credit_score in 300.0..579.0f64) {
        let input = RuleInput {
            credit_score: Some(credit_score),
            ..Default::default()
        };
        let strict = RuleEvaluator::evaluate(&input, &RuleCatalog::defaults());
        prop_assert_eq!(strict.outcome, AggregateOutcome::AutoDecline);

        let overrides = BTreeMap::from([(
            "min_credit_score".to_string(),
            RuleOverride {
                enabled: Some(false),
                ..Default::default()
            },
        )]);
        let catalog = RuleCatalog::resolve(default_rules(), &overrides, Vec::new()).unwrap();
        let relaxed = RuleEvaluator::evaluate(&input, &catalog);
        prop_assert_eq!(relaxed.outcome, AggregateOutcome::AutoApprove);
        prop_assert!(!relaxed.reasons.contains(&"min_credit_score".to_string()));
    }
}
