//! Routes inbound chat events to the ledger and composes the replies.
//!
//! The transport layer reduces every update to an [Event] and calls
//! [Dispatch::handle]; everything that happens between a message arriving
//! and a reply going out is decided here, so the behaviour can be tested
//! without Telegram.

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    chart::render_series_chart,
    database_id::{TransactionId, UserId},
    dialogue::{DialogueRegistry, EntryDialogue, Outcome, Prompt, Step, advance},
    dispatch::replies,
    ledger::{LedgerStore, NewTransaction, Transaction, TransactionKind},
    quick_entry::{QuickEntry, parse_quick_entry},
    report::Reports,
    timezone::get_local_offset,
};

/// How many days of spending the chart covers.
const CHART_DAYS: u32 = 7;

/// How many categories the report ranks.
const TOP_CATEGORY_LIMIT: usize = 5;

// ============================================================================
// EVENTS
// ============================================================================

/// An inbound chat event, stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A plain text message that is not a command or button press.
    Text {
        /// The user who sent the message.
        user: UserId,
        /// The message body.
        text: String,
    },
    /// A command, menu press or inline button press.
    Action {
        /// The user who triggered the action.
        user: UserId,
        /// The action to perform.
        action: Action,
    },
}

/// Everything the bot can be asked to do.
///
/// The transport maps slash commands, menu labels and callback data onto
/// this enum; every variant has exactly one handler in [Dispatch::handle].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Greet the user and show the main menu.
    Start,
    /// Begin a guided expense entry, asking for the amount first.
    BeginEntry,
    /// Begin a guided expense entry with the category already picked.
    PickCategory(String),
    /// Destroy the open dialogue, if any.
    Cancel,
    /// Show today's and this month's spending with the top categories.
    Report,
    /// Show the most recent transaction with edit and delete buttons.
    LastEntry,
    /// Send the seven-day spending chart.
    Chart,
    /// Show the running balance.
    Balance,
    /// Record an expense from a `/add` command line.
    Add(String),
    /// Record an income from an `/income` command line.
    Income(String),
    /// Delete a recorded transaction.
    DeleteTransaction(TransactionId),
    /// Begin amending the amount of a recorded transaction.
    EditTransaction(TransactionId),
}

impl Action {
    /// Map a message text onto an action.
    ///
    /// Recognises the slash commands, with or without a `@botname` suffix,
    /// and the main menu labels. Returns [None] for anything else, which
    /// callers treat as free text.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();

        match text {
            replies::MENU_ADD_EXPENSE => return Some(Action::BeginEntry),
            replies::MENU_REPORT => return Some(Action::Report),
            replies::MENU_LAST_ENTRY => return Some(Action::LastEntry),
            replies::MENU_CHART => return Some(Action::Chart),
            _ => {}
        }

        let (command, rest) = match text.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (text, ""),
        };
        // Group chats address commands as e.g. "/report@SkarbnykBot".
        let command = match command.split_once('@') {
            Some((name, _)) => name,
            None => command,
        };

        match command {
            "/start" => Some(Action::Start),
            "/cancel" => Some(Action::Cancel),
            "/report" => Some(Action::Report),
            "/last" => Some(Action::LastEntry),
            "/chart" => Some(Action::Chart),
            "/balance" => Some(Action::Balance),
            "/add" => Some(Action::Add(rest.to_owned())),
            "/income" => Some(Action::Income(rest.to_owned())),
            _ => None,
        }
    }

    /// Map inline button callback data onto an action.
    ///
    /// The callback formats are `del:<id>`, `edit:<id>` and `cat:<label>`.
    pub fn parse_callback(data: &str) -> Option<Self> {
        if let Some(id) = data.strip_prefix("del:") {
            return id.parse().ok().map(Action::DeleteTransaction);
        }

        if let Some(id) = data.strip_prefix("edit:") {
            return id.parse().ok().map(Action::EditTransaction);
        }

        data.strip_prefix("cat:")
            .map(|label| Action::PickCategory(label.to_owned()))
    }
}

// ============================================================================
// REPLIES
// ============================================================================

/// Which chat surface a keyboard renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardKind {
    /// The persistent reply keyboard under the message box.
    Menu,
    /// Buttons attached to a single message.
    Inline,
}

/// One pressable button.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    /// The visible label.
    pub label: String,
    /// What pressing the button sends back: callback data for inline
    /// buttons, while menu buttons echo their label as a message.
    pub data: String,
}

/// A keyboard to attach to a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyboard {
    /// Where the keyboard renders.
    pub kind: KeyboardKind,
    /// The buttons, one inner vector per row.
    pub rows: Vec<Vec<Button>>,
}

/// What the bot answers to one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// The message text, or the photo caption when `chart` is set.
    pub text: String,
    /// A keyboard to attach, if any.
    pub keyboard: Option<Keyboard>,
    /// A rendered PNG to send as a photo instead of a plain message.
    pub chart: Option<Vec<u8>>,
}

impl Reply {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            chart: None,
        }
    }

    fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    fn with_menu(self) -> Self {
        self.with_keyboard(replies::main_menu())
    }

    fn with_chart(mut self, chart: Vec<u8>) -> Self {
        self.chart = Some(chart);
        self
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Routes events to the ledger and composes replies.
///
/// One value serves every user. Each user's events are handled one at a
/// time while different users proceed in parallel; see [DialogueRegistry].
/// [Dispatch::handle] never fails: errors are logged and turned into
/// apologetic texts so the transport always has something to send.
#[derive(Debug)]
pub struct Dispatch<S> {
    ledger: S,
    dialogues: DialogueRegistry,
    local_timezone: String,
}

impl<S: LedgerStore> Dispatch<S> {
    /// Create a dispatcher over `ledger`.
    ///
    /// `local_timezone` must be a canonical timezone name such as
    /// "Europe/Kyiv"; it decides which calendar day entries are recorded
    /// on.
    pub fn new(ledger: S, local_timezone: &str) -> Self {
        Self {
            ledger,
            dialogues: DialogueRegistry::new(),
            local_timezone: local_timezone.to_owned(),
        }
    }

    /// Handle one inbound event and compose the reply.
    pub async fn handle(&self, event: Event) -> Reply {
        match event {
            Event::Text { user, text } => self.handle_text(user, &text).await,
            Event::Action { user, action } => self.handle_action(user, action).await,
        }
    }

    async fn handle_text(&self, user: UserId, text: &str) -> Reply {
        let mut dialogue = self.dialogues.lock(user).await;

        // An open dialogue consumes the text, even when it looks like a
        // quick entry.
        if let Some(state) = dialogue.take() {
            let snapshot = state.clone();

            return match advance(state, text) {
                Step::Continue { state, prompt } => {
                    *dialogue = Some(state);
                    prompt_reply(prompt)
                }
                Step::Commit(outcome) => match self.commit(user, outcome) {
                    Ok(reply) => reply,
                    Err(error) => {
                        tracing::error!("could not commit a dialogue for user {user}: {error}");
                        *dialogue = Some(snapshot);
                        Reply::new(replies::RETRY_TEXT)
                    }
                },
            };
        }

        match parse_quick_entry(text) {
            Some(entry) => match self.append_entry(user, entry, TransactionKind::Expense) {
                Ok(transaction) => {
                    Reply::new(replies::quick_confirmation(&transaction)).with_menu()
                }
                Err(error) => {
                    tracing::error!("could not record a quick entry for user {user}: {error}");
                    Reply::new(replies::RETRY_TEXT).with_menu()
                }
            },
            None => Reply::new(replies::FALLBACK_TEXT).with_menu(),
        }
    }

    async fn handle_action(&self, user: UserId, action: Action) -> Reply {
        let mut dialogue = self.dialogues.lock(user).await;

        match action {
            Action::Start => {
                *dialogue = None;
                Reply::new(replies::START_TEXT).with_menu()
            }
            Action::Cancel => {
                let text = if dialogue.take().is_some() {
                    replies::CANCELLED_TEXT
                } else {
                    replies::NOTHING_TO_CANCEL_TEXT
                };

                Reply::new(text).with_menu()
            }
            Action::BeginEntry => {
                *dialogue = Some(EntryDialogue::AwaitingAmount { category: None });
                Reply::new(replies::AMOUNT_PROMPT)
            }
            Action::PickCategory(category) => {
                *dialogue = Some(EntryDialogue::AwaitingAmount {
                    category: Some(category),
                });
                Reply::new(replies::AMOUNT_PROMPT)
            }
            Action::EditTransaction(id) => {
                *dialogue = Some(EntryDialogue::AwaitingNewAmount { transaction: id });
                Reply::new(replies::NEW_AMOUNT_PROMPT)
            }
            Action::DeleteTransaction(id) => match self.ledger.delete(id) {
                Ok(()) => Reply::new(replies::DELETED_TEXT),
                Err(Error::DeleteMissingTransaction) => Reply::new(replies::ALREADY_REMOVED_TEXT),
                Err(error) => trouble(user, error),
            },
            Action::Report => self
                .report(user)
                .unwrap_or_else(|error| trouble(user, error)),
            Action::LastEntry => self
                .last_entry(user)
                .unwrap_or_else(|error| trouble(user, error)),
            Action::Chart => self
                .chart(user)
                .unwrap_or_else(|error| trouble(user, error)),
            Action::Balance => self
                .balance(user)
                .unwrap_or_else(|error| trouble(user, error)),
            Action::Add(line) => self.record_line(user, &line, TransactionKind::Expense),
            Action::Income(line) => self.record_line(user, &line, TransactionKind::Income),
        }
    }

    /// Write a completed dialogue to the ledger.
    ///
    /// An amendment whose transaction was deleted mid-dialogue is reported
    /// as a normal reply: retrying would not bring the row back.
    fn commit(&self, user_id: UserId, outcome: Outcome) -> Result<Reply, Error> {
        match outcome {
            Outcome::Entry {
                amount,
                category,
                description,
            } => {
                let transaction = self.ledger.append(NewTransaction {
                    user_id,
                    date: self.today()?,
                    kind: TransactionKind::Expense,
                    amount,
                    category,
                    description,
                })?;

                Ok(Reply::new(replies::entry_confirmation(&transaction)).with_menu())
            }
            Outcome::Amend {
                transaction,
                amount,
            } => match self.ledger.update_amount(transaction, amount) {
                Ok(updated) => {
                    Ok(Reply::new(replies::update_confirmation(updated.amount)).with_menu())
                }
                Err(Error::UpdateMissingTransaction) => {
                    Ok(Reply::new(replies::NOTHING_TO_EDIT_TEXT).with_menu())
                }
                Err(error) => Err(error),
            },
        }
    }

    /// Record the argument line of a `/add` or `/income` command.
    fn record_line(&self, user_id: UserId, line: &str, kind: TransactionKind) -> Reply {
        if line.split_whitespace().nth(1).is_none() {
            let usage = match kind {
                TransactionKind::Income => replies::INCOME_USAGE_TEXT,
                TransactionKind::Expense => replies::ADD_USAGE_TEXT,
            };

            return Reply::new(usage).with_menu();
        }

        let Some(entry) = parse_quick_entry(line) else {
            return Reply::new(replies::INVALID_AMOUNT_TEXT).with_menu();
        };

        match self.append_entry(user_id, entry, kind) {
            Ok(transaction) => {
                let confirmation = match kind {
                    TransactionKind::Income => replies::income_confirmation(&transaction),
                    TransactionKind::Expense => replies::entry_confirmation(&transaction),
                };

                Reply::new(confirmation).with_menu()
            }
            Err(error) => {
                tracing::error!("could not record a command entry for user {user_id}: {error}");
                Reply::new(replies::RETRY_TEXT).with_menu()
            }
        }
    }

    fn append_entry(
        &self,
        user_id: UserId,
        entry: QuickEntry,
        kind: TransactionKind,
    ) -> Result<Transaction, Error> {
        self.ledger.append(NewTransaction {
            user_id,
            date: self.today()?,
            kind,
            amount: entry.amount,
            category: entry.category,
            description: entry.description,
        })
    }

    fn report(&self, user_id: UserId) -> Result<Reply, Error> {
        let today = self.today()?;
        let reports = Reports::new(&self.ledger);
        let daily_total = reports.daily_total(user_id, today)?;
        let monthly_total = reports.monthly_total(user_id, today.year(), today.month())?;
        let top =
            reports.top_categories(user_id, today.year(), today.month(), TOP_CATEGORY_LIMIT)?;

        Ok(Reply::new(replies::report_text(daily_total, monthly_total, &top)).with_menu())
    }

    fn last_entry(&self, user_id: UserId) -> Result<Reply, Error> {
        match self.ledger.latest(user_id)? {
            Some(transaction) => Ok(Reply::new(replies::last_entry_text(&transaction))
                .with_keyboard(replies::last_entry_keyboard(transaction.id))),
            None => Ok(Reply::new(replies::NO_ENTRIES_TEXT).with_menu()),
        }
    }

    fn chart(&self, user_id: UserId) -> Result<Reply, Error> {
        let series = Reports::new(&self.ledger).series_last_n_days(user_id, CHART_DAYS)?;

        if series.is_empty() {
            return Ok(Reply::new(replies::NO_CHART_DATA_TEXT).with_menu());
        }

        let chart = render_series_chart(&series)?;

        Ok(Reply::new(replies::CHART_CAPTION).with_chart(chart))
    }

    fn balance(&self, user_id: UserId) -> Result<Reply, Error> {
        let balance = Reports::new(&self.ledger).balance(user_id)?;

        Ok(Reply::new(replies::balance_text(balance)).with_menu())
    }

    /// Today's date in the bot's configured timezone.
    fn today(&self) -> Result<Date, Error> {
        let offset = get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))?;

        Ok(OffsetDateTime::now_utc().to_offset(offset).date())
    }
}

fn prompt_reply(prompt: Prompt) -> Reply {
    let reply = Reply::new(replies::prompt_text(prompt));

    // The category question doubles as a shortcut menu.
    match prompt {
        Prompt::Category | Prompt::CategoryRetry => {
            reply.with_keyboard(replies::category_keyboard())
        }
        _ => reply,
    }
}

fn trouble(user_id: UserId, error: Error) -> Reply {
    tracing::error!("could not handle an event for user {user_id}: {error}");

    Reply::new(replies::TROUBLE_TEXT).with_menu()
}
