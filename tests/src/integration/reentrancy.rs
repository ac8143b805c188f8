//! # Reentrancy
//!
//! Mailboxes may subscribe, unsubscribe and post on the bus that is calling
//! them. A post in progress keeps the mailbox set it started with.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Integer, Number, Recorder};
    use bus_telemetry::init_test_logging;
    use magic_bus::{mailbox, Bus, MailboxRef, MessageType};
    use parking_lot::Mutex;
    use std::sync::Arc;

    // =============================================================================
    // SUBSCRIPTION CHANGES DURING DELIVERY
    // =============================================================================

    #[test]
    fn test_subscribe_during_delivery_applies_to_next_post() {
        init_test_logging();
        let bus = Bus::new();
        let recorder = Recorder::new();
        let late = recorder.mailbox("late");

        let handle = bus.clone();
        let late_for_subscribe = Arc::clone(&late);
        bus.subscribe_to::<Integer>(&mailbox(move |_| {
            handle.subscribe_to::<Integer>(&late_for_subscribe);
            Ok(())
        }));

        bus.post(Integer(1));
        assert!(recorder.is_empty());
        assert!(bus.is_subscribed(MessageType::of::<Integer>(), &late));

        bus.post(Integer(2));
        assert_eq!(recorder.entries(), vec!["late"]);
    }

    #[test]
    fn test_unsubscribe_during_delivery_still_delivers_current_post() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        let victim = recorder.mailbox("victim");

        let handle = bus.clone();
        let target = Arc::clone(&victim);
        bus.subscribe_to::<Integer>(&mailbox(move |_| {
            handle.unsubscribe_from::<Integer>(&target);
            Ok(())
        }));
        bus.subscribe_to::<Integer>(&victim);

        bus.post(Integer(1));
        assert_eq!(recorder.entries(), vec!["victim"]);

        bus.post(Integer(2));
        assert_eq!(recorder.entries(), vec!["victim"]);
    }

    #[test]
    fn test_mailbox_unsubscribes_itself() {
        let bus = Bus::new();
        let hits = Arc::new(Mutex::new(0_usize));
        let slot: Arc<Mutex<Option<MailboxRef>>> = Arc::new(Mutex::new(None));

        let handle = bus.clone();
        let counter = Arc::clone(&hits);
        let own = Arc::clone(&slot);
        let once = mailbox(move |_| {
            *counter.lock() += 1;
            if let Some(me) = own.lock().take() {
                handle.unsubscribe_from::<Number>(&me);
            }
            Ok(())
        });
        *slot.lock() = Some(Arc::clone(&once));
        bus.subscribe_to::<Number>(&once);

        bus.post(Integer(1));
        bus.post(Integer(2));

        assert_eq!(*hits.lock(), 1);
        assert_eq!(bus.subscriber_count(MessageType::of::<Number>()), 0);
    }

    // =============================================================================
    // NESTED POSTS
    // =============================================================================

    #[test]
    fn test_nested_post_completes_before_outer_continues() {
        let bus = Bus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let handle = bus.clone();
        let outer_log = Arc::clone(&log);
        bus.subscribe_to::<Integer>(&mailbox(move |message| {
            outer_log.lock().push("integer:first");
            if let Some(Integer(n)) = message.downcast_ref::<Integer>() {
                handle.post(format!("nested {n}"));
            }
            Ok(())
        }));

        let after_log = Arc::clone(&log);
        bus.subscribe_to::<Integer>(&mailbox(move |_| {
            after_log.lock().push("integer:second");
            Ok(())
        }));

        let nested_log = Arc::clone(&log);
        bus.subscribe_to::<String>(&mailbox(move |_| {
            nested_log.lock().push("string");
            Ok(())
        }));

        bus.post(Integer(5));

        assert_eq!(
            *log.lock(),
            vec!["integer:first", "string", "integer:second"]
        );
    }

    #[test]
    fn test_chain_of_nested_posts() {
        let bus = Bus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handle = bus.clone();
        let sink = Arc::clone(&seen);
        bus.subscribe_to::<u32>(&mailbox(move |message| {
            if let Some(n) = message.downcast_ref::<u32>() {
                sink.lock().push(*n);
                if *n > 0 {
                    handle.post(*n - 1);
                }
            }
            Ok(())
        }));

        bus.post(3_u32);

        assert_eq!(*seen.lock(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_user_posts_do_not_count_toward_nesting_limit() {
        let bus = Bus::new();
        let recorder = Recorder::new();
        let handle = bus.clone();
        bus.subscribe_to::<u32>(&mailbox(move |message| {
            if let Some(n) = message.downcast_ref::<u32>() {
                if *n > 0 {
                    handle.post(*n - 1);
                }
            }
            Ok(())
        }));
        bus.subscribe_to::<u32>(&recorder.mailbox("u32"));

        let depth = u32::try_from(bus.config().max_depth * 4).unwrap_or(u32::MAX);
        bus.post(depth);

        assert_eq!(recorder.len(), depth as usize + 1);
        assert_eq!(bus.metrics().snapshot().depth_exceeded, 0);
    }
}
