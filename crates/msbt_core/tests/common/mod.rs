//! Hand-assembled MSBT files for tests. Deliberately does not use the
//! codec's own writer.
#![allow(dead_code)]

pub const PAD: u8 = 0xAB;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Order {
    Little,
    Big,
}

pub struct Fixture {
    pub order: Order,
    /// 0 = UTF-8, 1 = UTF-16
    pub encoding: u8,
    /// `labels[g]` = labels of group g as (name, string index)
    pub groups: Vec<Vec<(&'static str, u32)>>,
    pub strings: Vec<&'static str>,
    /// Section tags in file order.
    pub sections: Vec<&'static [u8; 4]>,
    /// ATR1 attribute count and the bytes after it.
    pub attributes: (u32, Vec<u8>),
}

impl Fixture {
    pub fn new(order: Order, encoding: u8) -> Self {
        Self {
            order,
            encoding,
            groups: vec![
                vec![("Greeting", 0), ("Farewell", 2)],
                vec![],
                vec![("Question", 1)],
            ],
            strings: vec!["Hello there!", "How are you?", "Bye."],
            sections: vec![b"LBL1", b"ATR1", b"TXT2"],
            // entry size 1, then one byte per string
            attributes: (3, vec![1, 0, 0, 0, 0x10, 0x11, 0x12]),
        }
    }

    fn u16(&self, v: u16) -> [u8; 2] {
        match self.order {
            Order::Little => v.to_le_bytes(),
            Order::Big => v.to_be_bytes(),
        }
    }

    fn u32(&self, v: u32) -> [u8; 4] {
        match self.order {
            Order::Little => v.to_le_bytes(),
            Order::Big => v.to_be_bytes(),
        }
    }

    pub fn encode_str(&self, s: &str) -> Vec<u8> {
        let mut out = Vec::new();
        if self.encoding == 0 {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        } else {
            for u in s.encode_utf16().chain(std::iter::once(0)) {
                out.extend_from_slice(&self.u16(u));
            }
        }
        out
    }

    fn lbl1(&self) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&self.u32(self.groups.len() as u32));
        let mut off = 4 + 8 * self.groups.len();
        let mut body = Vec::new();
        for g in &self.groups {
            p.extend_from_slice(&self.u32(g.len() as u32));
            p.extend_from_slice(&self.u32(off as u32));
            for (name, idx) in g {
                body.push(name.len() as u8);
                body.extend_from_slice(name.as_bytes());
                body.extend_from_slice(&self.u32(*idx));
                off += 1 + name.len() + 4;
            }
        }
        p.extend_from_slice(&body);
        p
    }

    fn txt2(&self) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&self.u32(self.strings.len() as u32));
        let mut off = 4 + 4 * self.strings.len();
        let mut body = Vec::new();
        for s in &self.strings {
            p.extend_from_slice(&self.u32(off as u32));
            let enc = self.encode_str(s);
            off += enc.len();
            body.extend_from_slice(&enc);
        }
        p.extend_from_slice(&body);
        p
    }

    fn payload(&self, tag: &[u8; 4]) -> Vec<u8> {
        match tag {
            b"LBL1" => self.lbl1(),
            b"TXT2" => self.txt2(),
            b"ATR1" => {
                let mut p = self.u32(self.attributes.0).to_vec();
                p.extend_from_slice(&self.attributes.1);
                p
            }
            b"NLI1" => vec![0, 0, 0, 0],
            b"ATO1" => (0u8..7).collect(),
            b"TSY1" => {
                let mut p = Vec::new();
                for i in 0..self.strings.len() as u32 {
                    p.extend_from_slice(&self.u32(i));
                }
                p
            }
            other => panic!("fixture does not know {:?}", other),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"MsgStdBn");
        out.extend_from_slice(match self.order {
            Order::Little => &[0xFF, 0xFE],
            Order::Big => &[0xFE, 0xFF],
        });
        out.extend_from_slice(&self.u16(0));
        out.push(self.encoding);
        out.push(0x03);
        out.extend_from_slice(&self.u16(self.sections.len() as u16));
        out.extend_from_slice(&self.u16(0));
        out.extend_from_slice(&self.u32(0)); // file size, patched below
        out.extend_from_slice(&[0u8; 10]);

        for tag in &self.sections {
            let p = self.payload(tag);
            // ATR1's leading count is not part of its size
            let size = if *tag == b"ATR1" { p.len() - 4 } else { p.len() };
            out.extend_from_slice(*tag);
            out.extend_from_slice(&self.u32(size as u32));
            out.extend_from_slice(&[0u8; 8]);
            out.extend_from_slice(&p);
            while out.len() % 16 != 0 {
                out.push(PAD);
            }
        }

        let size = self.u32(out.len() as u32);
        out[0x12..0x16].copy_from_slice(&size);
        out
    }
}

/// Overwrite the file-size field so it matches the buffer again.
pub fn fix_size(bytes: &mut [u8], order: Order) {
    let n = bytes.len() as u32;
    let b = match order {
        Order::Little => n.to_le_bytes(),
        Order::Big => n.to_be_bytes(),
    };
    bytes[0x12..0x16].copy_from_slice(&b);
}
