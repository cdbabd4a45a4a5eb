//! Transaction builders shared by unit tests.

use shared_types::{
    FullTransaction, Hash, Input, KeyPath, Outpoint, Output, ScriptType, Transaction,
    SEQUENCE_FINAL,
};

pub(crate) fn hash(n: u8) -> Hash {
    [n; 32]
}

pub(crate) struct TxBuilder {
    header: Transaction,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

pub(crate) fn tx(n: u8) -> TxBuilder {
    TxBuilder {
        header: Transaction {
            hash: hash(n),
            version: 1,
            ..Transaction::default()
        },
        inputs: Vec::new(),
        outputs: Vec::new(),
    }
}

impl TxBuilder {
    pub(crate) fn spend(self, parent: u8, index: u32) -> Self {
        self.spend_with_sequence(parent, index, SEQUENCE_FINAL)
    }

    pub(crate) fn spend_with_sequence(mut self, parent: u8, index: u32, sequence: u32) -> Self {
        self.inputs
            .push(Input::new(Outpoint::new(hash(parent), index), sequence));
        self
    }

    pub(crate) fn pay(mut self, value: u64) -> Self {
        self.outputs.push(Output::new(value, 0, ScriptType::P2pkh));
        self
    }

    pub(crate) fn receive(self, value: u64) -> Self {
        self.receive_as(value, ScriptType::P2pkh)
    }

    pub(crate) fn receive_as(mut self, value: u64, script_type: ScriptType) -> Self {
        let index = self.outputs.len() as u32;
        self.outputs
            .push(Output::new(value, 0, script_type).owned_by(KeyPath::receive(0, index)));
        self
    }

    pub(crate) fn change(mut self, value: u64) -> Self {
        let index = self.outputs.len() as u32;
        self.outputs
            .push(Output::new(value, 0, ScriptType::P2pkh).owned_by(KeyPath::change(0, index)));
        self
    }

    pub(crate) fn build(self) -> FullTransaction {
        FullTransaction::new(self.header, self.inputs, self.outputs)
    }
}
