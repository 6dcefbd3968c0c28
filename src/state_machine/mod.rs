pub mod subscription;

/// The [`StateMachine`] trait provides calling semantics for pure, deterministic state machines.
///
/// # Functionality
/// A state machine consumes a single [`Input`](StateMachine::Input) type and produces a single
/// [`Output`](StateMachine::Output) type. When there are several kinds of input or output these
/// are grouped into enums, and the implementor maps each variant onto an inherent method. Keeping
/// that mapping in this trait lets the inherent impl stay focused on the logic itself.
///
/// Outputs are buffered by the machine and drained by the caller through
/// [`poll_output`](StateMachine::poll_output) until it returns `None`. The caller is the "runner"
/// that owns the impure side of the system (shared registries, channels, sockets) and applies the
/// outputs to it.
///
/// # Invariants
/// Implementors *must* uphold the following so that the same sequence of inputs always yields the
/// same sequence of outputs.
///
/// ## No Interior Mutability
/// State is mutated only through `&mut self`. No [`std::cell`] containers and no locks.
///
/// Shared ownership through [`Rc`](std::rc::Rc) or [`Arc`](std::sync::Arc) is prohibited too, even
/// around immutable values, because their reference counts are not pure. Machines own their data
/// (a `String` rather than an interned `Arc<str>`), and the runner converts at the boundary. The
/// only shared data allowed is `&'static` references to values without interior mutability.
///
/// ## No IO
/// No [`std::io`], [`std::net`], channels, system time or system entropy. Anything of that kind is
/// injected through the input.
///
/// ## No Concurrency or Async
/// No threads, no tasks and no futures. The runner decides where the machine is driven from.
///
/// ## No Blocking
/// Every call returns in bounded time, so a machine can be driven from inside an async task.
///
/// # Side Effects
/// Logging through `tracing` is allowed as long as the machine's logic never depends on it.
///
/// # Example
/// ```ignore
/// pub enum CounterInput {
///     Add(u32),
///     Reset,
/// }
///
/// pub struct Total(u64);
///
/// impl StateMachine for Counter {
///     type Input = CounterInput;
///     type Output = Total;
///
///     fn process_input(&mut self, input: Self::Input) {
///         match input {
///             CounterInput::Add(n) => self.add(n),
///             CounterInput::Reset => self.reset(),
///         }
///     }
///
///     fn poll_output(&mut self) -> Option<Self::Output> {
///         self.take_pending_total().map(Total)
///     }
/// }
/// ```
pub trait StateMachine {
    /// The type of input that is [processed](StateMachine::process_input) by the state machine.
    type Input;
    /// The type of output that is [polled](StateMachine::poll_output) from the state machine.
    type Output;

    /// Process the provided `input` into the state machine.
    fn process_input(&mut self, input: Self::Input);

    /// Poll the state machine for output, returning the next buffered output if present.
    fn poll_output(&mut self) -> Option<Self::Output>;
}
