use crossbeam_channel::{unbounded, Receiver, Sender};
use super::PianoMessage;

/// MessageBus carries input from any producer thread to the UI thread
pub struct MessageBus {
    pub(crate) sender: Sender<PianoMessage>,
    pub(crate) receiver: Receiver<PianoMessage>,
}

impl MessageBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        
        MessageBus {
            sender,
            receiver,
        }
    }
    
    /// Get a sender that can be cloned and passed to input sources
    pub fn sender(&self) -> Sender<PianoMessage> {
        self.sender.clone()
    }
    
    /// Hand up to `max_messages` pending messages to `handler`, in arrival order
    pub fn process_messages(&self, max_messages: usize, mut handler: impl FnMut(PianoMessage)) -> usize {
        let mut count = 0;
        
        while count < max_messages {
            match self.receiver.try_recv() {
                Ok(msg) => {
                    count += 1;
                    handler(msg);
                },
                Err(_) => break,
            }
        }
        
        count
    }
    
    pub fn try_receive(&self) -> Result<PianoMessage, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }
    
    pub fn send(&self, msg: PianoMessage) -> Result<(), crossbeam_channel::SendError<PianoMessage>> {
        self.sender.send(msg)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
