use aide_core::event::MeetingRequest;

/// The typed, validated outcome of classifying one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Send this text back, nothing else.
    Reply { text: String },
    /// The model needs more information before it can schedule.
    AskForDetails { text: String },
    /// A fully validated meeting, ready for the credential gate.
    ScheduleMeeting(MeetingRequest),
    /// No outbound reply at all.
    Ignore,
    /// An email needs a human choice before anything is sent.
    Escalate {
        sender_email: String,
        subject: String,
        body: String,
        suggested_reply: String,
    },
}
