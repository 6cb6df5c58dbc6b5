//! Runtime header emitted ahead of the transformed body.
//!
//! The header binds the environment proxy and the decryptor the rewritten
//! body calls into. `bit32.bxor` is used when the runtime provides it, with
//! a pure-Lua xor fallback for runtimes that don't. The decryptor's key
//! index `(kd-1)%#da+1` must stay the exact inverse of the index arithmetic
//! in [`crate::crypt`]; the pipeline prepends this text after every
//! rewriting pass has run, so none of its own literals get mangled.

/// Table through which virtualized globals are resolved.
pub(crate) const ENV_PROXY: &str = "Ma";
/// Function the body calls to decrypt string literals.
pub(crate) const DECRYPT_FN: &str = "Ea";

const CHAR_FN: &str = "Q";
const BYTE_FN: &str = "Ca";
const XOR_FN: &str = "ed";

pub(crate) fn render() -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "-- Generated by Moonveil v{}\n",
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!("local {ENV_PROXY}=(getfenv())\n"));
    out.push_str(&format!(
        "local {CHAR_FN},{BYTE_FN},{XOR_FN}=(string.char),(string.byte),(bit32 and bit32.bxor or \
         function(a,b) local p,c=1,0 while a>0 and b>0 do local ra,rb=a%2,b%2 if ra~=rb then \
         c=c+p end a,b,p=(a-ra)/2,(b-rb)/2,p*2 end if a<b then a=b end while a>0 do local ra=a%2 \
         if ra>0 then c=c+p end a,p=(a-ra)/2,p*2 end return c end)\n"
    ));
    out.push_str(&format!(
        "local {DECRYPT_FN}=function(ib,da) local Vb='' for kd=1,#ib do \
         Vb=Vb..{CHAR_FN}({XOR_FN}({BYTE_FN}(ib,kd),{BYTE_FN}(da,(kd-1)%#da+1))) end return Vb end\n"
    ));
    out
}
