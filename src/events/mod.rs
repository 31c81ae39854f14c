//! Named-event delivery for unsolicited surface notifications.

pub(crate) mod dispatcher;
