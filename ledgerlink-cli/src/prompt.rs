//! Terminal prompts: the y/N upload confirmation and the interactive
//! account chooser used when no mapping or heuristic resolves an account.

use ledgerlink_core::{AccountId, AccountType, RemoteAccount, StatementAccount};
use ledgerlink_sync::{Decision, DecisionSource, NewAccount};
use std::io::{self, BufRead, Write};

fn read_answer<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<String> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(s.trim().to_string())
}

/// Ask a y/N question. Anything but `y`/`yes` is a no; so is closed input.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<bool> {
    match read_answer(input, out, &format!("{} (y/N): ", question)) {
        Ok(answer) => Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes")),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Asks the user on a terminal which ledger account a statement account is.
pub struct TerminalDecisions<R, W> {
    input: R,
    out: W,
    bank_tag: String,
}

impl TerminalDecisions<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(bank_tag: &str) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), bank_tag)
    }
}

impl<R: BufRead, W: Write> TerminalDecisions<R, W> {
    pub fn new(input: R, out: W, bank_tag: &str) -> Self {
        Self {
            input,
            out,
            bank_tag: bank_tag.to_string(),
        }
    }

    fn create_new(&mut self, statement: &StatementAccount) -> io::Result<Decision> {
        let name = read_answer(
            &mut self.input,
            &mut self.out,
            &format!("Name for the new account [{}]: ", statement.number),
        )?;
        let name = if name.is_empty() { statement.number.clone() } else { name };
        let account_type = match statement.account_type {
            AccountType::Unspecified => self.pick_type()?,
            t => t,
        };
        Ok(Decision::CreateNew(NewAccount {
            name,
            account_type,
            bank: self.bank_tag.clone(),
        }))
    }

    fn pick_type(&mut self) -> io::Result<AccountType> {
        loop {
            let answer = read_answer(
                &mut self.input,
                &mut self.out,
                "Account type (chequing/savings/visa): ",
            )?;
            match AccountType::from_statement(&answer) {
                AccountType::Unspecified => writeln!(self.out, "  unknown type {:?}", answer)?,
                t => return Ok(t),
            }
        }
    }
}

impl<R: BufRead, W: Write> DecisionSource for TerminalDecisions<R, W> {
    fn decide(
        &mut self,
        statement: &StatementAccount,
        candidates: &[RemoteAccount],
    ) -> io::Result<Decision> {
        writeln!(self.out)?;
        writeln!(self.out, "No ledger account matches {}.", statement)?;
        for (i, a) in candidates.iter().enumerate() {
            writeln!(self.out, "  {}) {} [{}] {}", i + 1, a.name, a.account_type, a.bank)?;
        }
        writeln!(self.out, "  0) create a new account")?;

        loop {
            let answer = read_answer(
                &mut self.input,
                &mut self.out,
                &format!("Choose 0-{}: ", candidates.len()),
            )?;
            match answer.parse::<usize>() {
                Ok(0) => return self.create_new(statement),
                Ok(n) if n <= candidates.len() => {
                    return Ok(Decision::UseExisting(AccountId::new(candidates[n - 1].id.as_str())));
                }
                _ => writeln!(self.out, "  invalid choice {:?}", answer)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn candidates() -> Vec<RemoteAccount> {
        vec![
            RemoteAccount::new("11", "RBC Day to Day Banking", AccountType::Chequing, "RBC"),
            RemoteAccount::new("12", "RBC High Interest eSavings", AccountType::Savings, "RBC"),
        ]
    }

    fn decide(script: &str, statement: &StatementAccount) -> (io::Result<Decision>, String) {
        let mut out = Vec::new();
        let result = {
            let mut d = TerminalDecisions::new(Cursor::new(script.as_bytes()), &mut out, "RBC");
            d.decide(statement, &candidates())
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_pick_existing_account() {
        let statement = StatementAccount::new("05172-5163878", AccountType::Savings);
        let (result, out) = decide("2\n", &statement);
        assert_eq!(result.unwrap(), Decision::UseExisting(AccountId::new("12")));
        assert!(out.contains("1) RBC Day to Day Banking [chequing] RBC"));
        assert!(out.contains("0) create a new account"));
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let statement = StatementAccount::new("05172-5163878", AccountType::Savings);
        let (result, out) = decide("7\nabc\n1\n", &statement);
        assert_eq!(result.unwrap(), Decision::UseExisting(AccountId::new("11")));
        assert_eq!(out.matches("invalid choice").count(), 2);
    }

    #[test]
    fn test_create_new_defaults_name_to_statement_number() {
        let statement = StatementAccount::new("4519", AccountType::CreditCard);
        let (result, _) = decide("0\n\n", &statement);
        assert_eq!(
            result.unwrap(),
            Decision::CreateNew(NewAccount {
                name: "4519".to_string(),
                account_type: AccountType::CreditCard,
                bank: "RBC".to_string(),
            })
        );
    }

    #[test]
    fn test_create_new_asks_type_when_statement_has_none() {
        let statement = StatementAccount::new("Unknown", AccountType::Unspecified);
        let (result, out) = decide("0\nMy Savings\nrrsp\nsavings\n", &statement);
        assert_eq!(
            result.unwrap(),
            Decision::CreateNew(NewAccount {
                name: "My Savings".to_string(),
                account_type: AccountType::Savings,
                bank: "RBC".to_string(),
            })
        );
        assert!(out.contains("unknown type \"rrsp\""));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let statement = StatementAccount::new("4519", AccountType::CreditCard);
        let (result, _) = decide("", &statement);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_confirm() {
        let mut out = Vec::new();
        assert!(confirm(&mut Cursor::new("YES\n"), &mut out, "upload 3 transactions?").unwrap());
        assert!(!confirm(&mut Cursor::new("n\n"), &mut out, "upload?").unwrap());
        assert!(!confirm(&mut Cursor::new(""), &mut out, "upload?").unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("upload 3 transactions? (y/N): "));
    }
}
