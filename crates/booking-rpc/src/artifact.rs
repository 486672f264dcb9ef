//! Build artifact loading and binding of the Booking interface.

use std::path::Path;

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::U256;
use log::debug;
use serde::Deserialize;

use booking_core::{BookingError, BookingResult};

/// A compiled contract artifact. Only the ABI is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: Option<String>,
    pub abi: JsonAbi,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactFile {
    Full(Artifact),
    AbiOnly(JsonAbi),
}

impl Artifact {
    /// Accepts a full artifact object or a bare ABI array.
    pub fn from_json(text: &str) -> BookingResult<Self> {
        let file: ArtifactFile = serde_json::from_str(text)
            .map_err(|e| BookingError::Connection(format!("artifact is not a contract ABI: {e}")))?;
        Ok(match file {
            ArtifactFile::Full(a) => a,
            ArtifactFile::AbiOnly(abi) => Artifact { contract_name: None, abi },
        })
    }

    pub fn load(path: &Path) -> BookingResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BookingError::Connection(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

/// A contract function with its parameter types resolved.
#[derive(Debug, Clone)]
pub struct Method {
    pub function: Function,
    pub inputs: Vec<DynSolType>,
    pub outputs: Vec<DynSolType>,
}

fn resolve(kinds: &[alloy_json_abi::Param], name: &str) -> BookingResult<Vec<DynSolType>> {
    kinds
        .iter()
        .map(|p| {
            DynSolType::parse(&p.ty).map_err(|e| BookingError::Connection(format!("{name}: {e}")))
        })
        .collect()
}

impl Method {
    fn new(function: Function) -> BookingResult<Self> {
        let inputs = resolve(&function.inputs, &function.name)?;
        let outputs = resolve(&function.outputs, &function.name)?;
        Ok(Self { function, inputs, outputs })
    }

    pub fn signature(&self) -> String {
        self.function.signature()
    }

    /// `v` typed as the `index`-th input, which must be an unsigned integer.
    pub fn uint_arg(&self, index: usize, v: u64) -> DynSolValue {
        let bits = match self.inputs.get(index) {
            Some(DynSolType::Uint(bits)) => *bits,
            _ => 256,
        };
        DynSolValue::Uint(U256::from(v), bits)
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[DynSolValue]) -> BookingResult<Vec<u8>> {
        self.function
            .abi_encode_input(args)
            .map_err(|e| BookingError::InvalidArgument(format!("{}: {e}", self.function.name)))
    }

    pub fn decode_output(&self, data: &[u8]) -> BookingResult<Vec<DynSolValue>> {
        self.function
            .abi_decode_output(data, true)
            .map_err(|e| BookingError::Decode(format!("{}: {e}", self.function.name)))
    }
}

/// Wire type of one slot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPayload {
    /// `bytes`
    Dynamic,
    /// `bytesN`, right padded with NUL.
    Fixed(usize),
}

/// Positions of the named `getRoom` outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomLayout {
    pub capacity: usize,
    pub status: usize,
    pub data: usize,
}

/// The four contract functions, checked against the shapes the client sends.
#[derive(Debug, Clone)]
pub struct BookingInterface {
    pub list_rooms: Method,
    pub get_room: Method,
    pub set_slots: Method,
    pub set_room: Method,
    pub room_layout: RoomLayout,
    pub slot_payload: SlotPayload,
}

fn is_uint(t: &DynSolType) -> bool {
    matches!(t, DynSolType::Uint(_))
}

fn is_uint_array(t: &DynSolType) -> bool {
    matches!(t, DynSolType::Array(inner) if is_uint(inner))
}

fn payload_of(t: &DynSolType) -> Option<SlotPayload> {
    match t {
        DynSolType::Array(inner) => match **inner {
            DynSolType::Bytes => Some(SlotPayload::Dynamic),
            DynSolType::FixedBytes(n) => Some(SlotPayload::Fixed(n)),
            _ => None,
        },
        _ => None,
    }
}

fn bad_shape(m: &Method) -> BookingError {
    BookingError::Connection(format!("ABI function {} has an unexpected shape", m.signature()))
}

fn output_index(m: &Method, name: &str, fallback: usize) -> usize {
    m.function.outputs.iter().position(|p| p.name == name).unwrap_or(fallback)
}

impl BookingInterface {
    pub fn bind(artifact: &Artifact) -> BookingResult<Self> {
        let find = |name: &str, arity: usize| -> BookingResult<Method> {
            let function = artifact
                .abi
                .function(name)
                .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
                .ok_or_else(|| BookingError::Connection(format!("ABI has no function {name} taking {arity} arguments")))?;
            Method::new(function.clone())
        };

        let list_rooms = find("listRooms", 0)?;
        let get_room = find("getRoom", 2)?;
        let set_slots = find("setSlots", 2)?;
        let set_room = find("setRoom", 2)?;

        if !matches!(&list_rooms.outputs[..], [ids] if is_uint_array(ids)) {
            return Err(bad_shape(&list_rooms));
        }
        if !get_room.inputs.iter().all(is_uint) || !set_room.inputs.iter().all(is_uint) {
            return Err(bad_shape(&get_room));
        }
        let slot_payload = match &set_slots.inputs[..] {
            [room, data] if is_uint(room) => payload_of(data).ok_or_else(|| bad_shape(&set_slots))?,
            _ => return Err(bad_shape(&set_slots)),
        };

        if get_room.outputs.len() != 3 {
            return Err(bad_shape(&get_room));
        }
        let room_layout = RoomLayout {
            capacity: output_index(&get_room, "capacity", 0),
            status: output_index(&get_room, "status", 1),
            data: output_index(&get_room, "data", 2),
        };
        let out = &get_room.outputs;
        if !is_uint(&out[room_layout.capacity])
            || !is_uint_array(&out[room_layout.status])
            || payload_of(&out[room_layout.data]).is_none()
        {
            return Err(bad_shape(&get_room));
        }

        debug!(
            "bound {} ({} functions, slot payload {:?})",
            artifact.contract_name.as_deref().unwrap_or("contract"),
            artifact.abi.functions().count(),
            slot_payload
        );
        Ok(Self { list_rooms, get_room, set_slots, set_room, room_layout, slot_payload })
    }
}
