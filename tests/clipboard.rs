//! Clipboard tests - copy, cut, paste and the selection transfer protocol

mod common;

use std::time::{Duration, Instant};

use common::{headless, select, test_entry, type_text, ENTRY, FOREIGN, OTHER};
use pixelprism::clipboard::{
    ForeignReply, HeadlessHost, HostRequest, SelectionClipboard, SelectionEvent, SelectionHost,
    Slot, Target, TicketStatus, TransferPayload, TransferReady, MAX_PENDING_REQUESTS,
};
use pixelprism::editable::{EditSession, EntryEvent, EntryMsg, MoveTarget, ValidationPolicy};

// ========================================================================
// Copy / cut / loopback paste
// ========================================================================

#[test]
fn test_copy_then_paste_within_process() {
    let mut cb = headless();
    let mut source = test_entry(ValidationPolicy::text(), "abcdef");
    select(&mut source, &mut cb, 1, 4);
    source.update(EntryMsg::Copy, &mut cb);

    assert_eq!(cb.owned_text(Slot::Clipboard), Some("bcd"));
    assert_eq!(cb.owned_text(Slot::Primary), Some("bcd"));
    assert_eq!(source.text(), "abcdef");

    // Loopback pastes apply without a round trip through the host
    let mut target = EditSession::new(OTHER, ValidationPolicy::text());
    let event = target.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(event, Some(EntryEvent::Changed));
    assert_eq!(target.text(), "bcd");
    assert_eq!(target.pending_pastes(), 0);
}

#[test]
fn test_cut_removes_selection() {
    let mut cb = headless();
    let mut entry = test_entry(ValidationPolicy::text(), "abcdef");
    select(&mut entry, &mut cb, 0, 2);

    assert_eq!(
        entry.update(EntryMsg::Cut, &mut cb),
        Some(EntryEvent::Changed)
    );
    assert_eq!(entry.text(), "cdef");
    assert_eq!(cb.owned_text(Slot::Clipboard), Some("ab"));

    entry.update(EntryMsg::Move(MoveTarget::LineEnd), &mut cb);
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(entry.text(), "cdefab");
}

#[test]
fn test_copy_without_selection_is_noop() {
    let mut cb = headless();
    let mut entry = test_entry(ValidationPolicy::text(), "abc");
    entry.update(EntryMsg::Copy, &mut cb);
    assert_eq!(cb.owned_text(Slot::Clipboard), None);
    assert!(!entry.can_paste(&cb));
}

#[test]
fn test_selection_mirrors_into_primary() {
    let mut cb = headless();
    let mut entry = test_entry(ValidationPolicy::text(), "hello world");
    entry.update(EntryMsg::SelectAll, &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), Some("hello world"));
    assert_eq!(cb.owned_text(Slot::Clipboard), None);

    entry.update(EntryMsg::Move(MoveTarget::LineEnd), &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), Some("hello world"));

    entry.update(EntryMsg::MoveWithSelection(MoveTarget::WordLeft), &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), Some("world"));
}

#[test]
fn test_auto_copy_primary_disabled() {
    let mut cb = headless();
    let mut entry =
        test_entry(ValidationPolicy::text(), "hello").with_auto_copy_primary(false);
    entry.update(EntryMsg::SelectAll, &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), None);
}

#[test]
fn test_paste_is_filtered_by_policy() {
    let mut cb = headless();
    cb.set_text(OTHER, Some("#12zz34-56"), Slot::Clipboard);

    let mut entry = test_entry(ValidationPolicy::hex(), "");
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(entry.text(), "#123456");
}

#[test]
fn test_paste_truncates_at_max_length() {
    let mut cb = headless();
    cb.set_text(OTHER, Some("abcdefabcdef"), Slot::Clipboard);

    let mut entry = test_entry(ValidationPolicy::hex(), "");
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(entry.text(), "#ABCDEF");
}

#[test]
fn test_paste_with_nothing_accepted_changes_nothing() {
    let mut cb = headless();
    cb.set_text(OTHER, Some("xyz"), Slot::Clipboard);

    let mut entry = test_entry(ValidationPolicy::integer(), "12");
    assert_eq!(entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb), None);
    assert_eq!(entry.text(), "12");
    assert!(!entry.can_undo());
}

#[test]
fn test_paste_undoes_in_one_step() {
    let mut cb = headless();
    cb.set_text(OTHER, Some("34"), Slot::Clipboard);
    let mut entry = test_entry(ValidationPolicy::integer(), "12");
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(entry.text(), "1234");

    entry.update(EntryMsg::Undo, &mut cb);
    assert_eq!(entry.text(), "12");
}

// ========================================================================
// Foreign owners
// ========================================================================

#[test]
fn test_paste_from_foreign_owner_arrives_after_pump() {
    let mut cb = headless();
    cb.host_mut()
        .serve_foreign(Slot::Clipboard, FOREIGN, "12, 34, 56");

    let mut entry = test_entry(ValidationPolicy::rgb_integer(), "");
    assert!(entry.can_paste(&cb));
    assert_eq!(entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb), None);
    assert_eq!(entry.pending_pastes(), 1);
    assert_eq!(entry.text(), "");

    assert_eq!(cb.pump(), 1);
    assert_eq!(entry.pump(), Some(EntryEvent::Changed));
    assert_eq!(entry.text(), "12, 34, 56");
    assert_eq!(cb.pending_count(), 0);
}

#[test]
fn test_paste_from_latin1_owner() {
    let mut cb = headless();
    cb.host_mut().foreign_claim(
        Slot::Primary,
        FOREIGN,
        ForeignReply::Payload(TransferPayload::latin1("90°")),
    );
    let mut entry = test_entry(ValidationPolicy::text(), "");
    entry.update(EntryMsg::Paste(Slot::Primary), &mut cb);
    cb.pump();
    entry.pump();
    assert_eq!(entry.text(), "90°");
}

#[test]
fn test_denied_and_incremental_transfers_resolve_empty() {
    let replies = [
        ForeignReply::Deny,
        ForeignReply::Payload(TransferPayload::Data {
            target: Target::Incremental,
            bytes: vec![0, 0, 16, 0],
        }),
        ForeignReply::Payload(TransferPayload::Data {
            target: Target::Other("image/png".to_string()),
            bytes: vec![0x89],
        }),
    ];

    for reply in replies {
        let mut cb = headless();
        cb.host_mut().foreign_claim(Slot::Clipboard, FOREIGN, reply);
        let ticket = cb.request_text(ENTRY, Slot::Clipboard);
        assert_eq!(ticket.poll(), TicketStatus::Pending);

        cb.pump();
        assert_eq!(ticket.poll(), TicketStatus::Resolved(None));
        assert_eq!(cb.pending_count(), 0);
    }
}

#[test]
fn test_paste_with_no_owner_resolves_immediately() {
    let mut cb = headless();
    let ticket = cb.request_text(ENTRY, Slot::Primary);
    assert_eq!(ticket.poll(), TicketStatus::Resolved(None));
}

#[test]
fn test_ninth_outstanding_request_resolves_empty() {
    let mut cb = headless();
    cb.host_mut()
        .foreign_claim(Slot::Clipboard, FOREIGN, ForeignReply::Silent);

    let tickets: Vec<_> = (0..MAX_PENDING_REQUESTS)
        .map(|_| cb.request_text(ENTRY, Slot::Clipboard))
        .collect();
    assert_eq!(cb.pending_count(), MAX_PENDING_REQUESTS);

    let ninth = cb.request_text(ENTRY, Slot::Clipboard);
    assert_eq!(ninth.poll(), TicketStatus::Resolved(None));
    for ticket in &tickets {
        assert_eq!(ticket.poll(), TicketStatus::Pending);
    }
}

#[test]
fn test_silent_owner_times_out() {
    let mut cb = SelectionClipboard::new(HeadlessHost::new())
        .with_timeout(Some(Duration::from_millis(100)));
    cb.host_mut()
        .foreign_claim(Slot::Clipboard, FOREIGN, ForeignReply::Silent);

    let mut entry = test_entry(ValidationPolicy::text(), "x");
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(cb.expire(Instant::now()), 0);

    assert_eq!(cb.expire(Instant::now() + Duration::from_millis(200)), 1);
    assert_eq!(entry.pump(), None);
    assert_eq!(entry.pending_pastes(), 0);
    assert_eq!(entry.text(), "x");
}

#[test]
fn test_closing_entry_abandons_its_pastes() {
    let mut cb = headless();
    cb.host_mut()
        .foreign_claim(Slot::Clipboard, FOREIGN, ForeignReply::Silent);

    let mut entry = test_entry(ValidationPolicy::text(), "");
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    assert_eq!(cb.pending_count(), 1);

    entry.close(&mut cb);
    assert_eq!(cb.pending_count(), 0);
}

#[test]
fn test_dropping_clipboard_resolves_outstanding_tickets() {
    let mut cb = headless();
    cb.host_mut()
        .foreign_claim(Slot::Clipboard, FOREIGN, ForeignReply::Silent);
    let ticket = cb.request_text(ENTRY, Slot::Clipboard);

    drop(cb);
    assert_eq!(ticket.poll(), TicketStatus::Resolved(None));
}

#[test]
fn test_sibling_with_empty_selection_keeps_primary_alive() {
    let mut cb = headless();
    let mut first = test_entry(ValidationPolicy::text(), "abc");
    first.update(EntryMsg::SelectAll, &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), Some("abc"));

    // An empty extend in a sibling mirrors "nothing selected"
    let mut second = EditSession::new(OTHER, ValidationPolicy::text());
    second.update(EntryMsg::MoveWithSelection(MoveTarget::LineEnd), &mut cb);
    assert_eq!(cb.owned_text(Slot::Primary), Some("abc"));
    assert_eq!(cb.host().owner(Slot::Primary), Some(ENTRY));

    let ticket = cb.request_text(OTHER, Slot::Primary);
    for _ in 0..5 {
        cb.pump();
    }
    assert_eq!(ticket.poll(), TicketStatus::Resolved(Some("abc".to_string())));
    assert_eq!(cb.pending_count(), 0);

    second.update(EntryMsg::Paste(Slot::Primary), &mut cb);
    assert_eq!(second.text(), "abc");
}

#[test]
fn test_late_answer_from_slow_owner() {
    let mut cb = headless();
    cb.host_mut()
        .foreign_claim(Slot::Clipboard, FOREIGN, ForeignReply::Silent);
    let ticket = cb.request_text(ENTRY, Slot::Clipboard);
    let convert = cb.host_mut().drain_requests();
    let Some(HostRequest::Convert { channel, .. }) = convert.last() else {
        panic!("expected a convert request, got {:?}", convert);
    };

    // The owner finally writes the property and acknowledges
    cb.host_mut()
        .put_payload(ENTRY, *channel, TransferPayload::utf8("late"));
    cb.host_mut().push_event(SelectionEvent::TransferReady(TransferReady {
        requester: ENTRY,
        slot: Slot::Clipboard,
        target: Target::Utf8String,
        channel: Some(*channel),
    }));
    assert_eq!(cb.pump(), 1);
    assert_eq!(ticket.poll(), TicketStatus::Resolved(Some("late".to_string())));
    assert!(cb.host().requests().is_empty());
}

#[test]
fn test_ownership_lost_for_other_surface_is_ignored() {
    let mut cb = headless();
    cb.set_text(ENTRY, Some("mine"), Slot::Clipboard);
    cb.host_mut().push_event(SelectionEvent::OwnershipLost {
        slot: Slot::Clipboard,
        surface: OTHER,
    });
    assert_eq!(cb.pump(), 0);
    assert_eq!(cb.owned_text(Slot::Clipboard), Some("mine"));
}

// ========================================================================
// Serving foreign requesters
// ========================================================================

#[test]
fn test_owner_serves_foreign_requests() {
    let mut cb = headless();
    let mut entry = test_entry(ValidationPolicy::hex(), "");
    type_text(&mut entry, &mut cb, "ff00aa");
    entry.update(EntryMsg::SelectAll, &mut cb);
    entry.update(EntryMsg::Copy, &mut cb);

    cb.host_mut()
        .foreign_request(FOREIGN, Slot::Clipboard, Target::Utf8String);
    cb.host_mut()
        .foreign_request(FOREIGN, Slot::Clipboard, Target::Other("image/png".into()));
    assert_eq!(cb.pump(), 2);

    let responses = cb.host().responses();
    assert_eq!(
        responses[0].payload,
        Some(TransferPayload::utf8("#FF00AA"))
    );
    assert_eq!(responses[1].payload, None);
}

#[test]
fn test_losing_ownership_forgets_text() {
    let mut cb = headless();
    let mut entry = test_entry(ValidationPolicy::text(), "abc");
    entry.update(EntryMsg::SelectAll, &mut cb);
    entry.update(EntryMsg::Copy, &mut cb);

    cb.host_mut().serve_foreign(Slot::Clipboard, FOREIGN, "xyz");
    cb.pump();
    assert_eq!(cb.owned_text(Slot::Clipboard), None);

    entry.update(EntryMsg::Move(MoveTarget::LineEnd), &mut cb);
    entry.update(EntryMsg::Paste(Slot::Clipboard), &mut cb);
    cb.pump();
    entry.pump();
    assert_eq!(entry.text(), "abcxyz");
}
