use crate::role::Role;
use crate::subscription::SubscriptionState;

/// Whether resolution must stop at deny-all.
///
/// True when the subscription is neither active nor in trial, unless the
/// role is admin. Admin subscription state is never inspected here.
pub fn is_locked(subscription: &SubscriptionState, role: &Role) -> bool {
    if role.is_admin() {
        return false;
    }
    !subscription.status.is_usable()
}
