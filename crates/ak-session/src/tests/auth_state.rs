use crate::AuthState;

use ak_core::{Identity, Profile};

use uuid::Uuid;

fn identity() -> Identity {
    Identity::new(Uuid::new_v4(), Some("user@example.com".to_string()))
}

#[test]
fn given_uninitialized_state_then_loading_and_unauthenticated() {
    let state = AuthState::uninitialized();

    assert!(state.loading);
    assert!(!state.is_authenticated());
    assert!(!state.needs_profile_setup());
}

#[test]
fn given_signed_out_state_then_settled_and_unauthenticated() {
    let state = AuthState::signed_out();

    assert!(!state.loading);
    assert!(!state.is_authenticated());
}

#[test]
fn given_settled_state_without_profile_then_needs_profile_setup() {
    let state = AuthState::settled(identity(), None);

    assert!(state.is_authenticated());
    assert!(state.needs_profile_setup());
}

#[test]
fn given_settled_state_with_profile_then_no_setup_needed() {
    let id = identity();
    let profile = Profile::new(id.id, id.email.clone());
    let state = AuthState::settled(id, Some(profile));

    assert!(state.is_authenticated());
    assert!(!state.needs_profile_setup());
}

#[test]
fn given_loading_state_then_not_flagged_for_setup() {
    let state = AuthState::loading(identity());

    assert!(state.loading);
    assert!(!state.needs_profile_setup());
}
