use pchain_prefetcher::types::{CallInput, Command, PublicAddress, TransferInput};

pub const COUNTER_KEY: &[u8] = b"counter";

pub struct ArgsBuilder {
    pub args: Option<Vec<Vec<u8>>>,
}

impl ArgsBuilder {
    pub fn new() -> Self {
        Self { args: None }
    }

    pub fn add<T: borsh::BorshSerialize>(mut self, arg: T) -> Self {
        if self.args.is_none() {
            self.args = Some(vec![]);
        }

        if let Some(args) = &mut self.args {
            args.push(arg.try_to_vec().unwrap())
        }
        self
    }

    pub fn make_transfer(self, amount: u64, recipient: PublicAddress) -> Command {
        Command::Transfer(TransferInput { recipient, amount })
    }

    pub fn make_call(
        self,
        amount: Option<u64>,
        target: PublicAddress,
        entry_name: &str,
    ) -> Command {
        Command::Call(CallInput {
            target,
            method: entry_name.to_string(),
            arguments: self.args,
            amount,
        })
    }
}
