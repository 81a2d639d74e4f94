/// Events delivered to the interrupt listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMessage {
    Interrupted,
}
