use serde::{Deserialize, Serialize};

use super::data::ListData;

/// Content of a block created through the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BlockData {
    Paragraph { text: String },
    List(ListData),
}

impl BlockData {
    pub fn empty_paragraph() -> Self {
        BlockData::Paragraph {
            text: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretPosition {
    Start,
    End,
}

/// What the list block needs from the document around it.
pub trait BlockHost {
    fn current_block_index(&self) -> usize;
    fn insert_block(&mut self, block: BlockData, index: usize);
    fn set_caret_to_block(&mut self, index: usize, position: CaretPosition);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockCommand {
    Insert { index: usize, block: BlockData },
    Focus { index: usize, position: CaretPosition },
}

/// Records host requests so they can be applied once the list block is no
/// longer borrowed by its key handler.
#[derive(Clone, Debug, Default)]
pub struct BlockCommands {
    current: usize,
    commands: Vec<BlockCommand>,
}

impl BlockCommands {
    pub fn new(current: usize) -> Self {
        Self {
            current,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[BlockCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<BlockCommand> {
        self.commands
    }
}

impl BlockHost for BlockCommands {
    fn current_block_index(&self) -> usize {
        self.current
    }

    fn insert_block(&mut self, block: BlockData, index: usize) {
        self.commands.push(BlockCommand::Insert { index, block });
    }

    fn set_caret_to_block(&mut self, index: usize, position: CaretPosition) {
        self.commands.push(BlockCommand::Focus { index, position });
    }
}
