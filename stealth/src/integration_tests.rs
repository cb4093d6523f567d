//! End-to-end scan tests
//!
//! These tests run the complete flow:
//! - Receiver keys → sender posts address and tag → receiver scans a pool
//! - Not-found scans, budgets and skipped candidates
//! - Parallel scans against sequential ones

#[cfg(test)]
mod scan_tests {
    use ark_bn254::{G1Affine, G2Affine};
    use ark_ec::AffineRepr;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::address::StealthAddress;
    use crate::engine::{Bn254Engine, PairingEngine};
    use crate::error::StealthError;
    use crate::group::{GroupElement, GroupId};
    use crate::keys::{generate_decoys, generate_ephemeral, KeyPair, ReceiverKeys, RoleAssignment};
    use crate::scanner::{PostedPayment, ScanBudget, ScanConfig, Scanner};
    use crate::{SchemeVariant, StealthAddressDeriver};

    /// One receiver and one payment posted to them
    struct Fixture {
        deriver: StealthAddressDeriver,
        receiver: ReceiverKeys,
        ephemeral: KeyPair,
        posted: PostedPayment,
        rng: StdRng,
    }

    impl Fixture {
        fn new(variant: SchemeVariant, roles: RoleAssignment, seed: u64) -> Self {
            let engine = Bn254Engine::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let deriver = StealthAddressDeriver::new(engine, variant, roles);

            let receiver = ReceiverKeys::generate(roles, &engine, &mut rng).expect("receiver keys");
            let ephemeral = generate_ephemeral(roles, &engine, &mut rng).expect("ephemeral key");
            let meta = receiver.meta_address();

            let posted = PostedPayment {
                address: deriver
                    .sender_address(ephemeral.secret(), &meta.spend_public, &meta.view_public)
                    .expect("sender address"),
                view_tag: deriver
                    .view_tags()
                    .sender_tag(ephemeral.secret(), &meta.view_public)
                    .expect("sender tag"),
            };

            Self {
                deriver,
                receiver,
                ephemeral,
                posted,
                rng,
            }
        }

        fn decoys(&mut self, count: usize) -> Vec<GroupElement> {
            let group = self.deriver.roles().ephemeral_group();
            generate_decoys(count, group, self.deriver.engine(), &mut self.rng).expect("decoys")
        }

        /// `count` decoys with the genuine key inserted at `position`
        fn pool_with_genuine(&mut self, count: usize, position: usize) -> Vec<GroupElement> {
            let mut pool = self.decoys(count);
            pool.insert(position, *self.ephemeral.public());
            pool
        }

        fn scanner(&self, config: ScanConfig) -> Scanner {
            Scanner::new(self.deriver.clone(), config).expect("scanner")
        }

        fn scan(&self, scanner: &Scanner, pool: &[GroupElement]) -> Result<crate::ScanOutcome, StealthError> {
            scanner.scan(
                pool,
                &self.posted,
                self.receiver.view().secret(),
                self.receiver.spend().public(),
            )
        }
    }

    // ==================== Scenarios ====================

    #[test]
    fn test_scan_finds_genuine_key_at_index_37() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 200);
        let pool = fx.pool_with_genuine(100, 37);
        assert_eq!(pool.len(), 101);

        let scanner = fx.scanner(ScanConfig::default());
        let outcome = fx.scan(&scanner, &pool).unwrap();

        let found = outcome.found.expect("genuine key should be found");
        assert_eq!(found.index, 37);
        assert_eq!(found.candidate, *fx.ephemeral.public());
        assert_eq!(outcome.stats.examined, 38);
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn test_scan_without_genuine_key_examines_everything() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 201);
        let pool = fx.decoys(100);

        let scanner = fx.scanner(ScanConfig::default());
        let outcome = fx.scan(&scanner, &pool).unwrap();

        assert!(outcome.found.is_none());
        assert_eq!(outcome.stats.examined, 100);
        assert_eq!(outcome.stats.skipped, 0);
        assert!(!outcome.budget_exhausted);
        // every decoy that survived the tag check failed the full comparison
        assert_eq!(outcome.stats.full_derivations, outcome.stats.tag_matches);
    }

    #[test]
    fn test_additive_addresses_are_valid_g1_points() {
        let engine = Bn254Engine::new();
        let roles = RoleAssignment::SpendG1ViewG2;
        let deriver = StealthAddressDeriver::new(engine, SchemeVariant::AdditivePairing, roles);
        let mut rng = StdRng::seed_from_u64(202);

        for _ in 0..1000 {
            let receiver = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap();
            let eph = generate_ephemeral(roles, &engine, &mut rng).unwrap();
            let meta = receiver.meta_address();

            match deriver
                .sender_address(eph.secret(), &meta.spend_public, &meta.view_public)
                .unwrap()
            {
                StealthAddress::Point(GroupElement::G1(p)) => {
                    assert!(!p.is_zero());
                    assert!(p.is_on_curve());
                    assert!(p.is_in_correct_subgroup_assuming_on_curve());
                }
                other => panic!("expected a G1 point address, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_raw_addresses_compare_gt_elements() {
        let engine = Bn254Engine::new();
        let roles = RoleAssignment::default();
        let deriver = StealthAddressDeriver::new(engine, SchemeVariant::RawPairing, roles);
        let mut rng = StdRng::seed_from_u64(203);

        let receiver = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap();
        let meta = receiver.meta_address();
        let first = generate_ephemeral(roles, &engine, &mut rng).unwrap();
        let second = generate_ephemeral(roles, &engine, &mut rng).unwrap();

        let a = deriver
            .sender_address(first.secret(), &meta.spend_public, &meta.view_public)
            .unwrap();
        let b = deriver
            .sender_address(second.secret(), &meta.spend_public, &meta.view_public)
            .unwrap();

        // the address is exactly e(K, V)^r, with no hashing applied
        let base = engine.pair(&meta.spend_public, &meta.view_public).unwrap();
        let expected = engine.gt_exp(&base, first.secret().as_field()).unwrap();
        assert_eq!(a, StealthAddress::Raw(expected));

        match (a, b) {
            (StealthAddress::Raw(x), StealthAddress::Raw(y)) => assert_ne!(x, y),
            other => panic!("expected raw GT addresses, got {:?}", other),
        }

        let recovered = deriver
            .receiver_address(first.public(), &meta.spend_public, receiver.view().secret())
            .unwrap();
        assert!(recovered.matches(&a));
        assert!(!recovered.matches(&b));
    }

    // ==================== Scanner behaviour ====================

    #[test]
    fn test_every_variant_and_role_scans_successfully() {
        let mut seed = 210;
        for variant in SchemeVariant::ALL {
            for roles in [RoleAssignment::SpendG1ViewG2, RoleAssignment::SpendG2ViewG1] {
                let mut fx = Fixture::new(variant, roles, seed);
                seed += 1;
                let pool = fx.pool_with_genuine(30, 11);

                for use_view_tag in [true, false] {
                    let scanner = fx.scanner(ScanConfig {
                        use_view_tag,
                        ..ScanConfig::default()
                    });
                    let outcome = fx.scan(&scanner, &pool).unwrap();
                    assert_eq!(outcome.found.map(|m| m.index), Some(11), "variant {} roles {}", variant, roles);
                }
            }
        }
    }

    #[test]
    fn test_baseline_scan_derives_every_candidate() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 220);
        let pool = fx.pool_with_genuine(20, 15);

        let scanner = fx.scanner(ScanConfig {
            use_view_tag: false,
            ..ScanConfig::default()
        });
        let outcome = fx.scan(&scanner, &pool).unwrap();

        assert_eq!(outcome.found.map(|m| m.index), Some(15));
        assert_eq!(outcome.stats.full_derivations, 16);
        assert_eq!(outcome.stats.tag_matches, 0);
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 221);
        let mut pool = fx.pool_with_genuine(120, 90);
        // a second copy further down must never win
        pool.insert(25, *fx.ephemeral.public());

        let sequential = fx.scan(&fx.scanner(ScanConfig::default()), &pool).unwrap();
        let parallel = fx
            .scan(
                &fx.scanner(ScanConfig {
                    workers: 4,
                    ..ScanConfig::default()
                }),
                &pool,
            )
            .unwrap();

        assert_eq!(sequential.found.map(|m| m.index), Some(25));
        assert_eq!(parallel.found, sequential.found);
    }

    #[test]
    fn test_parallel_scan_without_match() {
        let mut fx = Fixture::new(SchemeVariant::AdditivePairing, RoleAssignment::SpendG2ViewG1, 222);
        let pool = fx.decoys(64);

        let scanner = fx.scanner(ScanConfig {
            workers: 3,
            ..ScanConfig::default()
        });
        let outcome = fx.scan(&scanner, &pool).unwrap();

        assert!(outcome.found.is_none());
        assert_eq!(outcome.stats.examined, 64);
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn test_candidate_budget_is_honoured() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 223);
        let pool = fx.pool_with_genuine(60, 50);

        let tight = fx.scanner(ScanConfig {
            budget: ScanBudget {
                max_candidates: Some(20),
                max_millis: None,
            },
            ..ScanConfig::default()
        });
        let outcome = fx.scan(&tight, &pool).unwrap();
        assert!(outcome.found.is_none());
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.stats.examined, 20);

        let roomy = fx.scanner(ScanConfig {
            budget: ScanBudget {
                max_candidates: Some(51),
                max_millis: None,
            },
            ..ScanConfig::default()
        });
        let outcome = fx.scan(&roomy, &pool).unwrap();
        assert_eq!(outcome.found.map(|m| m.index), Some(50));
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn test_generous_deadline_does_not_interfere() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 224);
        let pool = fx.pool_with_genuine(10, 4);

        let scanner = fx.scanner(ScanConfig {
            budget: ScanBudget {
                max_candidates: None,
                max_millis: Some(60_000),
            },
            ..ScanConfig::default()
        });
        let outcome = fx.scan(&scanner, &pool).unwrap();
        assert_eq!(outcome.found.map(|m| m.index), Some(4));
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn test_expired_deadline_stops_scan_early() {
        // One pairing per candidate in variant B; 2,000 of them never fit in 1 ms
        let mut fx = Fixture::new(SchemeVariant::AdditivePairing, RoleAssignment::SpendG2ViewG1, 240);
        let pool = fx.decoys(2_000);

        for workers in [1, 2] {
            let scanner = fx.scanner(ScanConfig {
                workers,
                budget: ScanBudget {
                    max_candidates: None,
                    max_millis: Some(1),
                },
                ..ScanConfig::default()
            });
            let outcome = fx.scan(&scanner, &pool).unwrap();

            assert!(outcome.found.is_none());
            assert!(outcome.budget_exhausted, "workers = {}", workers);
            assert!(
                outcome.stats.examined < pool.len(),
                "workers = {}: examined {}",
                workers,
                outcome.stats.examined
            );
        }
    }

    #[test]
    fn test_malformed_candidates_are_skipped() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::SpendG1ViewG2, 225);
        let mut pool = fx.pool_with_genuine(10, 8);
        // identity and wrong-group candidates ahead of the genuine key
        pool.insert(2, GroupElement::G2(G2Affine::zero()));
        pool.insert(5, GroupElement::G1(G1Affine::generator()));

        for use_view_tag in [true, false] {
            let scanner = fx.scanner(ScanConfig {
                use_view_tag,
                ..ScanConfig::default()
            });
            let outcome = fx.scan(&scanner, &pool).unwrap();

            assert_eq!(outcome.found.map(|m| m.index), Some(10));
            assert_eq!(outcome.stats.skipped, 2);
        }
    }

    #[test]
    fn test_foreign_address_kind_is_an_error() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 226);
        let pool = fx.decoys(4);
        fx.posted.address = StealthAddress::Point(*fx.receiver.spend().public());

        let scanner = fx.scanner(ScanConfig::default());
        let err = fx.scan(&scanner, &pool).unwrap_err();
        assert!(matches!(err, StealthError::SchemeMismatch(_)));
    }

    #[test]
    fn test_bad_spend_key_is_an_error() {
        let mut fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 227);
        let pool = fx.decoys(4);

        let scanner = fx.scanner(ScanConfig::default());
        let err = scanner
            .scan(
                &pool,
                &fx.posted,
                fx.receiver.view().secret(),
                fx.receiver.view().public(),
            )
            .unwrap_err();
        assert!(matches!(err, StealthError::InvalidKey(_)));
    }

    #[test]
    fn test_scanner_rejects_zero_workers() {
        let fx = Fixture::new(SchemeVariant::HashedPairing, RoleAssignment::default(), 228);
        let result = Scanner::new(
            fx.deriver.clone(),
            ScanConfig {
                workers: 0,
                ..ScanConfig::default()
            },
        );
        assert!(matches!(result, Err(StealthError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_builds_working_scanner() {
        let mut fx = Fixture::new(SchemeVariant::AdditivePairing, RoleAssignment::SpendG2ViewG1, 229);
        let pool = fx.pool_with_genuine(8, 3);

        let config = crate::StealthConfig {
            pool_size: 8,
            variant: SchemeVariant::AdditivePairing,
            roles: RoleAssignment::SpendG2ViewG1,
            scan: ScanConfig::default(),
        };
        let scanner = config.scanner().unwrap();
        assert_eq!(scanner.deriver().variant(), SchemeVariant::AdditivePairing);
        assert_eq!(scanner.deriver().roles().spend_group(), GroupId::G2);

        let outcome = fx.scan(&scanner, &pool).unwrap();
        assert_eq!(outcome.found.map(|m| m.index), Some(3));
    }
}
