//! # Delivery Order
//!
//! Within one `post`:
//!
//! 1. `AnyMessage` subscribers first
//! 2. Ancestor subscribers, most general to most specific
//! 3. Runtime-type subscribers last
//!
//! and, within one type, subscription order.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Comparable, Integer, Long, Number, Recorder};
    use bus_telemetry::init_test_logging;
    use magic_bus::{mailbox, Bus, MessageType};

    // =============================================================================
    // TYPE WALK
    // =============================================================================

    /// AnyMessage / Number / Integer: A, then B, then C, each exactly once.
    #[test]
    fn test_root_supertype_concrete_order() {
        init_test_logging();
        let bus = Bus::new();
        let recorder = Recorder::new();

        bus.subscribe(MessageType::root(), &recorder.mailbox("A"));
        bus.subscribe_to::<Number>(&recorder.mailbox("B"));
        bus.subscribe_to::<Integer>(&recorder.mailbox("C"));

        let delivery = bus.post(Integer(42));

        assert_eq!(recorder.entries(), vec!["A", "B", "C"]);
        assert_eq!(delivery.delivered, 3);
    }

    #[test]
    fn test_order_independent_of_subscription_sequence() {
        let bus = Bus::new();
        let recorder = Recorder::new();

        bus.subscribe_to::<Integer>(&recorder.mailbox("integer"));
        bus.subscribe_to::<Comparable>(&recorder.mailbox("comparable"));
        bus.subscribe_to::<Number>(&recorder.mailbox("number"));
        bus.subscribe(MessageType::root(), &recorder.mailbox("any"));

        bus.post(Integer(1));

        // Number is declared before Comparable on Integer.
        assert_eq!(
            recorder.entries(),
            vec!["any", "number", "comparable", "integer"]
        );
    }

    #[test]
    fn test_sibling_types_share_ancestors_only() {
        let bus = Bus::new();
        let recorder = Recorder::new();

        bus.subscribe_to::<Number>(&recorder.mailbox("number"));
        bus.subscribe_to::<Integer>(&recorder.mailbox("integer"));
        bus.subscribe_to::<Long>(&recorder.mailbox("long"));

        bus.post(Long(7));
        bus.post(Integer(7));

        assert_eq!(recorder.entries(), vec!["number", "long", "number", "integer"]);
    }

    #[test]
    fn test_root_subscriber_sees_everything() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        bus.subscribe(MessageType::root(), &recorder.mailbox("any"));

        bus.post(Integer(1));
        bus.post(String::from("text"));
        bus.post(3.5_f64);

        assert_eq!(recorder.count("any"), 3);
    }

    // =============================================================================
    // SUBSCRIPTION ORDER
    // =============================================================================

    #[test]
    fn test_insertion_order_within_type() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        for label in ["1", "2", "3", "4", "5"] {
            bus.subscribe_to::<String>(&recorder.mailbox(label));
        }

        bus.post(String::from("x"));

        assert_eq!(recorder.entries(), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_resubscribe_keeps_original_position() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        let first = recorder.mailbox("first");
        let second = recorder.mailbox("second");

        bus.subscribe_to::<String>(&first);
        bus.subscribe_to::<String>(&second);
        bus.subscribe_to::<String>(&first);

        bus.post(String::from("x"));

        assert_eq!(recorder.entries(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_then_resubscribe_moves_to_end() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        let first = recorder.mailbox("first");
        let second = recorder.mailbox("second");

        bus.subscribe_to::<String>(&first);
        bus.subscribe_to::<String>(&second);
        bus.unsubscribe_from::<String>(&first);
        bus.subscribe_to::<String>(&first);

        bus.post(String::from("x"));

        assert_eq!(recorder.entries(), vec!["second", "first"]);
    }

    #[test]
    fn test_same_mailbox_under_several_types_runs_per_type() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        let shared = recorder.mailbox("shared");

        bus.subscribe_to::<Number>(&shared);
        bus.subscribe_to::<Integer>(&shared);

        bus.post(Integer(5));

        // One registration per key, each matched once.
        assert_eq!(recorder.count("shared"), 2);

        bus.unsubscribe_from::<Number>(&shared);
        bus.post(Integer(5));
        assert_eq!(recorder.count("shared"), 3);
    }

    #[test]
    fn test_closure_mailboxes_compare_by_identity() {
        let bus = Bus::new();
        let a = mailbox(|_| Ok(()));
        let b = mailbox(|_| Ok(()));

        bus.subscribe_to::<u8>(&a);
        bus.subscribe_to::<u8>(&b);

        assert_eq!(bus.subscriber_count(MessageType::of::<u8>()), 2);
        assert!(bus.unsubscribe_from::<u8>(&a));
        assert!(bus.is_subscribed(MessageType::of::<u8>(), &b));
        assert!(!bus.is_subscribed(MessageType::of::<u8>(), &a));
    }
}
