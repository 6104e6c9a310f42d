//! Interactive menu shell
//!
//! The shell is a small state machine. Each iteration handles one state and
//! returns the next one, until `State::Exit` is reached or input runs out.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::crawler::Crawler;
use crate::error::{Error, Result};
use crate::history::History;
use crate::report::ReportBuilder;
use crate::types::MAX_TERMS;

/// States of the interactive menu loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Show the menu and read a choice
    MainMenu,
    /// Prompt for a directory and terms, then build and save a report
    Searching,
    /// Print every saved report
    ShowingHistory,
    /// Truncate the history log
    DeletingHistory,
    /// Leave the loop
    Exit,
}

impl State {
    /// Map a menu choice to the state it selects
    #[must_use]
    pub const fn from_choice(choice: u32) -> Option<Self> {
        match choice {
            1 => Some(Self::Searching),
            2 => Some(Self::ShowingHistory),
            3 => Some(Self::DeletingHistory),
            4 => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Interactive shell over an input and an output stream
#[derive(Debug)]
pub struct Shell<R, W> {
    input:   R,
    output:  W,
    builder: ReportBuilder,
    history: History,
    /// Tokens read ahead of the current prompt
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Create a shell reading from `input` and writing to `output`
    pub fn new(input: R, output: W, builder: ReportBuilder, history: History) -> Self {
        Self { input, output, builder, history, pending: VecDeque::new() }
    }

    /// Run the menu loop until the user exits or input ends
    ///
    /// # Errors
    /// Returns error if reading input or writing output fails
    pub fn run(&mut self) -> Result<()> {
        let mut state = State::MainMenu;
        while state != State::Exit {
            state = self.step(state)?;
        }
        writeln!(self.output, "\n\nThank you for using the program.\n")?;
        self.output.flush()?;
        Ok(())
    }

    /// Handle one state and return the next
    ///
    /// # Errors
    /// Returns error if reading input or writing output fails
    pub fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::MainMenu => self.main_menu(),
            State::Searching => self.search(),
            State::ShowingHistory => self.show_history(),
            State::DeletingHistory => self.delete_history(),
            State::Exit => Ok(State::Exit),
        }
    }

    fn main_menu(&mut self) -> Result<State> {
        self.pending.clear();
        write!(
            self.output,
            "\n\n\t********************** WELCOME **********************\n\n\
             What would you like to do?\n\
             1.  Find term and document frequencies\n\
             2.  Show search history\n\
             3.  Delete search history\n\
             4.  Exit\n\
             Enter the option number:\n>> "
        )?;
        self.output.flush()?;

        let Some(line) = self.read_line()? else {
            return Ok(State::Exit);
        };
        match line.trim().parse().ok().and_then(State::from_choice) {
            Some(next) => Ok(next),
            None => {
                writeln!(self.output, "Invalid choice!!")?;
                Ok(State::MainMenu)
            },
        }
    }

    fn search(&mut self) -> Result<State> {
        write!(self.output, "Enter a directory to read:\t")?;
        self.output.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(State::Exit);
        };
        let dir = PathBuf::from(line.trim());

        // Reject a bad directory before asking for terms
        if let Err(e) = Crawler::check_dir(&dir) {
            self.report_error(&e)?;
            return self.pause();
        }

        let Some(nterms) = self.read_term_count()? else {
            return Ok(State::Exit);
        };

        writeln!(self.output, "Enter the terms:")?;
        let mut terms = Vec::with_capacity(nterms);
        for i in 1..=nterms {
            write!(self.output, "Term {i}:\t")?;
            self.output.flush()?;
            let Some(term) = self.next_token()? else {
                return Ok(State::Exit);
            };
            terms.push(term);
        }

        match self.builder.build(&dir, &terms) {
            Ok(report) => {
                writeln!(self.output, "\n{report}")?;
                match self.history.append(&report) {
                    Ok(()) => writeln!(self.output, "\n\tSearch saved to history")?,
                    Err(e) => self.report_error(&e)?,
                }
            },
            Err(e) => self.report_error(&e)?,
        }

        self.pause()
    }

    /// Prompt until a term count between 1 and `MAX_TERMS` is entered
    fn read_term_count(&mut self) -> Result<Option<usize>> {
        loop {
            write!(self.output, "How many terms would you like to search for?\t")?;
            self.output.flush()?;
            let Some(token) = self.next_token()? else {
                return Ok(None);
            };
            match token.parse::<usize>() {
                Ok(n) if (1..=MAX_TERMS).contains(&n) => return Ok(Some(n)),
                Ok(n) if n > MAX_TERMS => self.report_error(&Error::TooManyTerms)?,
                _ => writeln!(self.output, "Please enter a number from 1 to {MAX_TERMS}")?,
            }
            self.pending.clear();
        }
    }

    fn show_history(&mut self) -> Result<State> {
        writeln!(self.output, "\n\t\t\t\t\tSEARCH HISTORY\n")?;
        match self.history.list() {
            Ok(reports) if reports.is_empty() => writeln!(self.output, "\n\tNo data found!")?,
            Ok(reports) => {
                for (i, report) in reports.iter().enumerate() {
                    writeln!(self.output, "\n\t#{}\n{report}\n", i + 1)?;
                }
            },
            Err(e) => self.report_error(&e)?,
        }
        self.pause()
    }

    fn delete_history(&mut self) -> Result<State> {
        match self.history.clear() {
            Ok(()) => writeln!(self.output, "\n\tSuccessfully deleted search history")?,
            Err(e) => self.report_error(&e)?,
        }
        self.pause()
    }

    /// Wait for Enter before going back to the menu
    fn pause(&mut self) -> Result<State> {
        self.pending.clear();
        write!(self.output, "\n\nPress Enter to go back to the main menu...\n")?;
        self.output.flush()?;
        Ok(if self.read_line()?.is_some() { State::MainMenu } else { State::Exit })
    }

    fn report_error(&mut self, err: &Error) -> Result<()> {
        writeln!(self.output, "\n{}", err.user_message())?;
        Ok(())
    }

    /// Read one line without its terminator, or `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Next whitespace-delimited token, reading more lines as needed
    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }
}
